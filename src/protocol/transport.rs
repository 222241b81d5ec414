use std::io::{self, Read, Write};

use log::trace;
use prost::Message;
use thiserror::Error;

use crate::{
    codec::{self, DecodeError},
    proto::transaction::{Code, ServerFrame, Status, TxReq, TxRes, server_frame},
};

/// Largest frame accepted from a peer, in bytes.
pub const MAX_FRAME_LEN: usize = 4 * 1024 * 1024;

/// Longest varint accepted as a frame length prefix.
const MAX_VARINT_LEN: usize = 10;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("transport IO error: {0}")]
    Io(#[from] io::Error),
    #[error("frame of {0} bytes exceeds the {MAX_FRAME_LEN} byte limit")]
    FrameTooLarge(usize),
    #[error("malformed frame length prefix")]
    BadLength,
    #[error("connection closed by peer")]
    Closed,
    #[error("server aborted the transaction with {code:?}: {message}")]
    Status { code: Code, message: String },
    #[error("server frame carried no body")]
    EmptyFrame,
}

/// Request/response channel driven by a session.
///
/// One call to [`Transport::send`] is answered by exactly one [`Transport::recv`].
pub trait Transport {
    fn send(&mut self, req: &TxReq) -> Result<(), TransportError>;
    fn recv(&mut self) -> Result<TxRes, TransportError>;
}

/// Length-delimited message framing over a byte stream.
pub struct ProtocolTransport<T: Read + Write> {
    stream: T,
}

impl<T: Read + Write> ProtocolTransport<T> {
    pub fn new(stream: T) -> Self {
        Self { stream }
    }

    pub fn into_inner(self) -> T {
        self.stream
    }

    pub fn write_request(&mut self, req: &TxReq) -> Result<(), TransportError> {
        self.write_frame(req)
    }

    pub fn write_response(&mut self, res: TxRes) -> Result<(), TransportError> {
        self.write_frame(&ServerFrame {
            body: Some(server_frame::Body::Res(res)),
        })
    }

    pub fn write_status(&mut self, code: Code, message: String) -> Result<(), TransportError> {
        self.write_frame(&ServerFrame {
            body: Some(server_frame::Body::Status(Status {
                code: code.into(),
                message,
            })),
        })
    }

    /// Next request, or `None` when the client closed the stream between frames.
    pub fn read_request(&mut self) -> Result<Option<TxReq>, TransportError> {
        match self.read_frame()? {
            Some(bytes) => Ok(Some(codec::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn read_response(&mut self) -> Result<TxRes, TransportError> {
        let bytes = self.read_frame()?.ok_or(TransportError::Closed)?;
        let frame: ServerFrame = codec::decode(&bytes)?;
        match frame.body {
            Some(server_frame::Body::Res(res)) => Ok(res),
            Some(server_frame::Body::Status(status)) => Err(TransportError::Status {
                code: status.code(),
                message: status.message,
            }),
            None => Err(TransportError::EmptyFrame),
        }
    }

    fn write_frame<M: Message>(&mut self, message: &M) -> Result<(), TransportError> {
        let bytes = message.encode_length_delimited_to_vec();
        trace!("writing frame of {} bytes", bytes.len());
        self.stream.write_all(&bytes)?;
        self.stream.flush()?;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let len = match self.read_length()? {
            Some(len) => len,
            None => return Ok(None),
        };
        if len > MAX_FRAME_LEN {
            return Err(TransportError::FrameTooLarge(len));
        }

        let mut buf = vec![0; len];
        self.stream.read_exact(&mut buf)?;
        trace!("read frame of {len} bytes");
        Ok(Some(buf))
    }

    fn read_length(&mut self) -> Result<Option<usize>, TransportError> {
        let mut value: u64 = 0;
        for i in 0..MAX_VARINT_LEN {
            let mut byte = [0u8; 1];
            if let Err(e) = self.stream.read_exact(&mut byte) {
                return match e.kind() {
                    io::ErrorKind::UnexpectedEof if i == 0 => Ok(None),
                    _ => Err(e.into()),
                };
            }
            value |= u64::from(byte[0] & 0x7f) << (7 * i);
            if byte[0] & 0x80 == 0 {
                return usize::try_from(value)
                    .map(Some)
                    .map_err(|_| TransportError::BadLength);
            }
        }
        Err(TransportError::BadLength)
    }
}

impl<T: Read + Write> Transport for ProtocolTransport<T> {
    fn send(&mut self, req: &TxReq) -> Result<(), TransportError> {
        self.write_request(req)
    }

    fn recv(&mut self) -> Result<TxRes, TransportError> {
        self.read_response()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Seek};

    use super::*;
    use crate::proto::{
        Empty,
        transaction::{OpenReq, TxType, tx_req, tx_res},
    };

    fn open_request() -> TxReq {
        tx_req::Req::Open(OpenReq {
            keyspace: "social_network".into(),
            tx_type: TxType::Write.into(),
            ..Default::default()
        })
        .into()
    }

    #[test]
    fn read_write_request() {
        let stream = Cursor::new(Vec::new());
        let mut transport = ProtocolTransport::new(stream);

        transport.write_request(&open_request()).unwrap();
        transport.stream.seek(std::io::SeekFrom::Start(0)).unwrap();
        let req = transport.read_request().unwrap();
        assert_eq!(req, Some(open_request()));

        // Clean EOF between frames.
        assert!(transport.read_request().unwrap().is_none());
    }

    #[test]
    fn read_write_response() {
        let stream = Cursor::new(Vec::new());
        let mut transport = ProtocolTransport::new(stream);

        let res = TxRes::from(tx_res::Res::Commit(Empty {}));
        transport.write_response(res.clone()).unwrap();
        transport.stream.seek(std::io::SeekFrom::Start(0)).unwrap();
        assert_eq!(transport.recv().unwrap(), res);
    }

    #[test]
    fn status_frame_surfaces_as_error() {
        let stream = Cursor::new(Vec::new());
        let mut transport = ProtocolTransport::new(stream);

        transport
            .write_status(Code::FailedPrecondition, "no open transaction".into())
            .unwrap();
        transport.stream.seek(std::io::SeekFrom::Start(0)).unwrap();

        match transport.recv() {
            Err(TransportError::Status { code, message }) => {
                assert_eq!(code, Code::FailedPrecondition);
                assert_eq!(message, "no open transaction");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn truncated_frame_is_io_error() {
        let mut bytes = open_request().encode_length_delimited_to_vec();
        bytes.truncate(bytes.len() - 3);
        let mut transport = ProtocolTransport::new(Cursor::new(bytes));

        assert!(matches!(
            transport.read_request(),
            Err(TransportError::Io(_))
        ));
    }

    #[test]
    fn oversized_frame_is_rejected_before_reading() {
        // Varint for 8 MiB.
        let bytes = vec![0x80, 0x80, 0x80, 0x04];
        let mut transport = ProtocolTransport::new(Cursor::new(bytes));

        assert!(matches!(
            transport.read_request(),
            Err(TransportError::FrameTooLarge(len)) if len == 8 * 1024 * 1024
        ));
    }

    #[test]
    fn closed_stream_while_awaiting_response() {
        let mut transport = ProtocolTransport::new(Cursor::new(Vec::new()));
        assert!(matches!(transport.recv(), Err(TransportError::Closed)));
    }
}
