//! Request/response transport between transmitter and receiver
//!
//! One request per line, JSON encoded, answered by one JSON line. The
//! receiver handles connections one at a time.

use crate::pipeline::{Pipeline, PipelineError, Result};
use commsim_frame::link::Received;
use commsim_core::bits::format_bits;
use commsim_core::schemes::{
    CarrierScheme, CorrectionScheme, DetectionScheme, FramingScheme, LineCode, SchemeSet,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Default receiver address
pub const DEFAULT_ADDR: &str = "127.0.0.1:8765";

/// Encoded transmission sent to the receiver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub samples: Vec<f64>,
    pub digital_scheme: LineCode,
    pub carrier_scheme: CarrierScheme,
    pub framing_scheme: FramingScheme,
    pub detection_scheme: DetectionScheme,
    pub correction_scheme: CorrectionScheme,
}

impl Request {
    pub fn new(schemes: SchemeSet, samples: Vec<f64>) -> Self {
        Self {
            samples,
            digital_scheme: schemes.line_code,
            carrier_scheme: schemes.carrier,
            framing_scheme: schemes.framing,
            detection_scheme: schemes.detection,
            correction_scheme: schemes.correction,
        }
    }

    /// Get the scheme selection carried by this request
    pub fn schemes(&self) -> SchemeSet {
        SchemeSet {
            framing: self.framing_scheme,
            detection: self.detection_scheme,
            correction: self.correction_scheme,
            line_code: self.digital_scheme,
            carrier: self.carrier_scheme,
        }
    }
}

/// Receiver answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Decoded { text: String, binary: String },
    Failed { error: String, kind: String },
}

impl Response {
    /// Success answer for a decoded message
    pub fn from_received(received: &Received) -> Self {
        Response::Decoded {
            text: received.text.clone(),
            binary: format_bits(&received.payload),
        }
    }

    /// Failure answer carrying the error kind name
    pub fn from_error(e: &PipelineError) -> Self {
        Response::Failed {
            error: e.to_string(),
            kind: e.kind().as_str().to_string(),
        }
    }
}

/// Decode one request into its response
pub fn handle_request(request: &Request) -> Response {
    match Pipeline::new(request.schemes()).receive(&request.samples) {
        Ok(received) => Response::from_received(&received),
        Err(e) => {
            warn!("Request failed: {}", e);
            Response::from_error(&e)
        }
    }
}

/// Decode one raw request line
pub fn handle_line(line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => handle_request(&request),
        Err(e) => Response::from_error(&PipelineError::from(e)),
    }
}

/// Server accepting requests over TCP
pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Bind the receiver
    pub async fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    /// Get the bound address
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve connections until an accept error
    pub async fn run(self) -> Result<()> {
        info!("Receiver listening on {}", self.local_addr()?);

        loop {
            let (stream, peer) = self.listener.accept().await?;
            debug!("Connection from {}", peer);
            if let Err(e) = handle_connection(stream).await {
                warn!("Connection error: {}", e);
            }
        }
    }
}

async fn handle_connection(stream: TcpStream) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(&line);
        let mut payload = serde_json::to_string(&response)?;
        payload.push('\n');
        write_half.write_all(payload.as_bytes()).await?;
        write_half.flush().await?;
    }

    Ok(())
}

/// Send a request and wait for the answer
pub async fn send_request(addr: &str, request: &Request) -> Result<Response> {
    let stream = TcpStream::connect(addr).await?;
    let (read_half, mut write_half) = stream.into_split();

    let mut payload = serde_json::to_string(request)?;
    payload.push('\n');
    write_half.write_all(payload.as_bytes()).await?;
    write_half.flush().await?;

    let mut lines = BufReader::new(read_half).lines();
    let line = lines.next_line().await?.ok_or_else(|| {
        PipelineError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "receiver closed the connection without answering",
        ))
    })?;

    Ok(serde_json::from_str(&line)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hi_request() -> Request {
        let schemes = SchemeSet::default();
        let mut pipeline = Pipeline::new(schemes);
        let sent = pipeline.transmit("Hi").unwrap();
        Request::new(schemes, sent.signal.samples)
    }

    #[test]
    fn test_request_field_names() {
        let json = serde_json::to_value(hi_request()).unwrap();
        assert_eq!(json["digitalScheme"], "nrz-polar");
        assert_eq!(json["carrierScheme"], "ask");
        assert_eq!(json["framingScheme"], "length-prefix");
        assert_eq!(json["detectionScheme"], "parity");
        assert_eq!(json["correctionScheme"], "none");
    }

    #[test]
    fn test_request_json_keeps_samples_exact() {
        let request = Request::new(SchemeSet::default(), vec![0.39507750618784515, -1.0 / 3.0, 0.1 + 0.2]);
        let line = serde_json::to_string(&request).unwrap();
        let parsed: Request = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, request);

        let sent = hi_request();
        let parsed: Request = serde_json::from_str(&serde_json::to_string(&sent).unwrap()).unwrap();
        assert_eq!(parsed.samples, sent.samples);
    }

    #[test]
    fn test_handle_request() {
        let response = handle_request(&hi_request());
        assert_eq!(
            response,
            Response::Decoded {
                text: "Hi".to_string(),
                binary: "01001000 01101001".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_scheme_name() {
        let line = r#"{"samples":[],"digitalScheme":"NRZ-Polar","carrierScheme":"PSK","framingScheme":"bit-stuffing","detectionScheme":"none","correctionScheme":"none"}"#;
        match handle_line(line) {
            Response::Failed { kind, .. } => assert_eq!(kind, "ConfigurationError"),
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[test]
    fn test_error_response_shape() {
        let mut request = hi_request();
        request.samples.truncate(150);
        let json = serde_json::to_value(handle_request(&request)).unwrap();
        assert_eq!(json["kind"], "DemodulationError");
        assert!(json.get("text").is_none());
    }

    #[tokio::test]
    async fn test_serve_and_send() {
        let server = Server::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap().to_string();
        let handle = tokio::spawn(server.run());

        let response = send_request(&addr, &hi_request()).await.unwrap();
        assert!(matches!(response, Response::Decoded { ref text, .. } if text == "Hi"));

        handle.abort();
    }
}
