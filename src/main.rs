mod cli;
mod command;
mod error;
mod logging;
mod session;
mod shell;
mod transport;

use clap::Parser;
use cli::Args;
use session::Session;
use shell::Shell;
use transport::SerialConnector;

use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let logging = logging::init(args.verbose);

    let config = args.serial_config();
    info!(
        "Serial link: {} baud, {:?} response timeout, {:?} reader timeout",
        config.baud_rate, config.timeouts.response, config.timeouts.reader
    );

    let mut session = Session::new(SerialConnector::new(config));
    if let Some(port) = args.port {
        session.set_endpoint(port);
    }

    let mut shell = Shell::new(session, Some(logging));
    shell.run().await
}
