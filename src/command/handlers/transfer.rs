//! Dump and log transfer handlers
//!
//! The local file is opened before the device is asked for anything, so a bad
//! path never starts a transfer.

use crate::command::{Capability, CommandResult};
use crate::error::CommandError;
use crate::transport::DeviceConnection;
use std::io;
use std::path::Path;
use tokio::fs::File;

fn transfer_io(path: &Path) -> impl FnOnce(io::Error) -> CommandError + '_ {
    move |source| CommandError::TransferIo {
        path: path.to_path_buf(),
        source,
    }
}

/// Handle `download` and `log`: device image into a local file
pub async fn handle_download(
    conn: &mut dyn DeviceConnection,
    capability: Capability,
    path: &Path,
) -> Result<CommandResult, CommandError> {
    let mut file = File::create(path).await.map_err(transfer_io(path))?;

    let received = conn
        .transfer_out(capability.descriptor().command, &mut file)
        .await?;

    Ok(CommandResult::Completed {
        message: format!(
            "{} Bytes successfully written to {}",
            received,
            path.display()
        ),
    })
}

/// Handle `upload`: local file into the device
pub async fn handle_upload(
    conn: &mut dyn DeviceConnection,
    capability: Capability,
    path: &Path,
) -> Result<CommandResult, CommandError> {
    let mut file = File::open(path).await.map_err(transfer_io(path))?;

    let metadata = file.metadata().await.map_err(transfer_io(path))?;
    if !metadata.is_file() {
        return Err(transfer_io(path)(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }

    let sent = conn
        .transfer_in(capability.descriptor().command, &mut file)
        .await?;

    Ok(CommandResult::Completed {
        message: format!("{} Bytes successfully read from {}", sent, path.display()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockDevice;
    use chameleon_protocol::{DeviceCommand, RequestLine};

    #[tokio::test]
    async fn test_download_reports_transfer_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.dump");
        let device = MockDevice::new();
        device.with_image(vec![0xA5; 1024]);

        let mut conn = device.connection();
        let result = handle_download(&mut conn, Capability::Download, &path)
            .await
            .unwrap();

        assert_eq!(
            result.message(),
            format!("1024 Bytes successfully written to {}", path.display())
        );
        assert_eq!(std::fs::read(&path).unwrap(), vec![0xA5; 1024]);
        assert_eq!(device.requests(), vec![RequestLine::Action(DeviceCommand::Download)]);
    }

    #[tokio::test]
    async fn test_log_uses_log_download() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.log");
        let device = MockDevice::new();
        device.with_image(vec![1, 2, 3]);

        let mut conn = device.connection();
        handle_download(&mut conn, Capability::Log, &path).await.unwrap();
        assert_eq!(
            device.requests(),
            vec![RequestLine::Action(DeviceCommand::LogDownload)]
        );
    }

    #[tokio::test]
    async fn test_upload_reports_transfer_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.dump");
        std::fs::write(&path, vec![0x11; 4096]).unwrap();
        let device = MockDevice::new();

        let mut conn = device.connection();
        let result = handle_upload(&mut conn, Capability::Upload, &path)
            .await
            .unwrap();

        assert_eq!(
            result.message(),
            format!("4096 Bytes successfully read from {}", path.display())
        );
        assert_eq!(device.uploaded().len(), 4096);
    }

    #[tokio::test]
    async fn test_missing_upload_file_never_reaches_device() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.dump");
        let device = MockDevice::new();

        let mut conn = device.connection();
        let result = handle_upload(&mut conn, Capability::Upload, &path).await;

        match result {
            Err(CommandError::TransferIo { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("expected transfer I/O error, got {:?}", other),
        }
        assert!(device.requests().is_empty());
    }

    #[tokio::test]
    async fn test_directory_is_not_uploadable() {
        let dir = tempfile::tempdir().unwrap();
        let device = MockDevice::new();

        let mut conn = device.connection();
        let result = handle_upload(&mut conn, Capability::Upload, dir.path()).await;

        assert!(matches!(result, Err(CommandError::TransferIo { .. })));
        assert!(device.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unwritable_download_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("card.dump");
        let device = MockDevice::new();

        let mut conn = device.connection();
        let result = handle_download(&mut conn, Capability::Download, &path).await;

        assert!(matches!(result, Err(CommandError::TransferIo { .. })));
        assert!(device.requests().is_empty());
    }
}
