//! Scripted in-memory device used by the handler and session tests

use crate::error::DeviceError;
use crate::transport::traits::{ByteSink, ByteSource, Connector, DeviceConnection};
use async_trait::async_trait;
use chameleon_protocol::{DeviceCommand, RequestLine, Response};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Everything the fake device saw and will answer
#[derive(Debug, Default)]
pub struct MockState {
    pub requests: Vec<RequestLine>,
    pub responses: VecDeque<Response>,
    pub image: Vec<u8>,
    pub uploaded: Vec<u8>,
    pub opened: Vec<String>,
    pub closed: usize,
    pub fail_open: bool,
    pub fail_close: bool,
}

/// Handle shared between the test and the connections it hands out
#[derive(Debug, Clone, Default)]
pub struct MockDevice {
    state: Arc<Mutex<MockState>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next response the device will give
    pub fn respond(&self, response: Response) -> &Self {
        self.state.lock().unwrap().responses.push_back(response);
        self
    }

    /// Image returned by download-style transfers
    pub fn with_image(&self, image: Vec<u8>) -> &Self {
        self.state.lock().unwrap().image = image;
        self
    }

    pub fn fail_open(&self) -> &Self {
        self.state.lock().unwrap().fail_open = true;
        self
    }

    pub fn fail_close(&self) -> &Self {
        self.state.lock().unwrap().fail_close = true;
        self
    }

    pub fn requests(&self) -> Vec<RequestLine> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn uploaded(&self) -> Vec<u8> {
        self.state.lock().unwrap().uploaded.clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.state.lock().unwrap().opened.clone()
    }

    pub fn closed(&self) -> usize {
        self.state.lock().unwrap().closed
    }

    /// A connection bound to this device, bypassing the connector
    pub fn connection(&self) -> MockConnection {
        MockConnection {
            state: self.state.clone(),
        }
    }

    fn answer(&self, request: RequestLine) -> Result<Response, DeviceError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request);
        state.responses.pop_front().ok_or(DeviceError::Disconnected)
    }
}

pub struct MockConnection {
    state: Arc<Mutex<MockState>>,
}

impl MockConnection {
    fn device(&self) -> MockDevice {
        MockDevice {
            state: self.state.clone(),
        }
    }
}

#[async_trait]
impl DeviceConnection for MockConnection {
    async fn query(&mut self, command: DeviceCommand) -> Result<Response, DeviceError> {
        self.device().answer(RequestLine::Query(command))
    }

    async fn set(&mut self, command: DeviceCommand, value: &str) -> Result<Response, DeviceError> {
        self.device()
            .answer(RequestLine::Set(command, value.to_string()))
    }

    async fn suggest(&mut self, command: DeviceCommand) -> Result<Response, DeviceError> {
        self.device()
            .answer(RequestLine::Suggest(command))
            .map(Response::into_suggestions)
    }

    async fn action(&mut self, command: DeviceCommand) -> Result<Response, DeviceError> {
        self.device().answer(RequestLine::Action(command))
    }

    async fn transfer_out(
        &mut self,
        command: DeviceCommand,
        sink: &mut ByteSink<'_>,
    ) -> Result<u64, DeviceError> {
        let image = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(RequestLine::Action(command));
            state.image.clone()
        };
        sink.write_all(&image).await?;
        sink.flush().await?;
        Ok(image.len() as u64)
    }

    async fn transfer_in(
        &mut self,
        command: DeviceCommand,
        source: &mut ByteSource<'_>,
    ) -> Result<u64, DeviceError> {
        self.state
            .lock()
            .unwrap()
            .requests
            .push(RequestLine::Action(command));
        let mut data = Vec::new();
        source.read_to_end(&mut data).await?;
        let count = data.len() as u64;
        self.state.lock().unwrap().uploaded = data;
        Ok(count)
    }

    async fn close(&mut self) -> Result<(), DeviceError> {
        let mut state = self.state.lock().unwrap();
        state.closed += 1;
        if state.fail_close {
            return Err(DeviceError::Disconnected);
        }
        Ok(())
    }
}

#[async_trait]
impl Connector for MockDevice {
    async fn open(&self, endpoint: &str) -> Result<Box<dyn DeviceConnection>, DeviceError> {
        let mut state = self.state.lock().unwrap();
        state.opened.push(endpoint.to_string());
        if state.fail_open {
            return Err(DeviceError::Open {
                endpoint: endpoint.to_string(),
                reason: "No such file or directory".into(),
            });
        }
        Ok(Box::new(self.connection()))
    }

    fn name(&self) -> &'static str {
        "Mock"
    }
}
