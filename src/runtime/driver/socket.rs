use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::error::DeskError;
use crate::geometry::Point;
use crate::interaction::{PointerButton, PointerEvent};
use crate::model::{SeatId, SeatStyle, TableOrientation, TableShape};
use crate::presentation::ViewSnapshot;
use crate::runtime::{DeskCommand, DeskEvent, DeskRuntime};

pub type DriverResult<T> = std::result::Result<T, SocketDriverError>;

#[derive(Debug, Error)]
pub enum SocketDriverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("runtime error: {0}")]
    Runtime(#[from] DeskError),
}

/// Decodes inbound frames into runtime events and encodes replies.
pub trait SocketStrategy {
    type Inbound: DeserializeOwned;

    fn decode(&self, payload: Self::Inbound) -> Result<Vec<DeskEvent>, SocketDriverError>;
    fn reply(&self, runtime: &DeskRuntime) -> Result<String, SocketDriverError>;
    fn reject(&self, error: &SocketDriverError) -> String;
}

/// TCP transport for one client at a time. Each line is one JSON frame; each
/// frame is answered with one line. Bad frames are answered with an error
/// frame and the connection stays open.
pub struct SocketDriver<S: SocketStrategy> {
    listener: TcpListener,
    runtime: DeskRuntime,
    strategy: S,
}

impl<S: SocketStrategy> SocketDriver<S> {
    pub fn bind<A>(addr: A, runtime: DeskRuntime, strategy: S) -> DriverResult<Self>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr)?;
        Ok(Self {
            listener,
            runtime,
            strategy,
        })
    }

    pub fn local_addr(&self) -> DriverResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve the first connection until it closes or sends `exit`.
    pub fn run(mut self) -> DriverResult<()> {
        let accepted = self.listener.incoming().next();
        if let Some(stream) = accepted {
            let stream = stream?;
            stream.set_nodelay(true).ok();
            self.runtime.mount();

            let inbound = BufReader::new(stream.try_clone()?);
            let mut writer = stream;
            for line in inbound.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let frame = match self.handle_line(&line) {
                    Ok(frame) => frame,
                    Err(err @ SocketDriverError::Io(_)) => return Err(err),
                    Err(err) => self.strategy.reject(&err),
                };
                writer.write_all(frame.as_bytes())?;
                writer.write_all(b"\n")?;
                writer.flush()?;
                if self.runtime.exit_requested() {
                    break;
                }
            }
            self.runtime.teardown();
        }
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> DriverResult<String> {
        let payload: S::Inbound =
            serde_json::from_str(line).map_err(|err| SocketDriverError::Decode(err.to_string()))?;
        for event in self.strategy.decode(payload)? {
            self.runtime.process(event)?;
        }
        self.strategy.reply(&self.runtime)
    }
}

/// Default protocol: tagged JSON frames in, view snapshots out.
pub struct JsonDeskStrategy;

#[derive(Debug, Clone, Copy, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

impl From<WireButton> for PointerButton {
    fn from(button: WireButton) -> Self {
        match button {
            WireButton::Primary => PointerButton::Primary,
            WireButton::Secondary => PointerButton::Secondary,
            WireButton::Middle => PointerButton::Middle,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum JsonInbound {
    PointerDown {
        x: i32,
        y: i32,
        #[serde(default)]
        button: WireButton,
    },
    PointerMove {
        x: i32,
        y: i32,
    },
    PointerUp {
        x: i32,
        y: i32,
    },
    AddSeat,
    ToggleSeat {
        id: SeatId,
    },
    RotateSeat {
        id: SeatId,
    },
    RenameSeat {
        id: SeatId,
        name: String,
    },
    SetSeatStyle {
        id: SeatId,
        #[serde(default)]
        style: Option<SeatStyle>,
    },
    SetDefaultSeatStyle {
        style: SeatStyle,
    },
    SetTableShape {
        shape: TableShape,
    },
    SetTableOrientation {
        orientation: TableOrientation,
    },
    SetTableColor {
        color: String,
    },
    /// Sensor payload, either inline JSON or a JSON-encoded string.
    Telemetry {
        payload: Value,
    },
    Tick {
        ms: u64,
    },
    Snapshot,
    Exit,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum JsonOutbound<'a> {
    Snapshot { snapshot: &'a ViewSnapshot },
    Error { message: String },
}

impl SocketStrategy for JsonDeskStrategy {
    type Inbound = JsonInbound;

    fn decode(&self, payload: Self::Inbound) -> Result<Vec<DeskEvent>, SocketDriverError> {
        let command = |command| vec![DeskEvent::Command(command)];
        Ok(match payload {
            JsonInbound::PointerDown { x, y, button } => vec![DeskEvent::Pointer(PointerEvent::Down {
                position: Point::new(x, y),
                button: button.into(),
            })],
            JsonInbound::PointerMove { x, y } => vec![DeskEvent::Pointer(PointerEvent::Move {
                position: Point::new(x, y),
            })],
            JsonInbound::PointerUp { x, y } => vec![DeskEvent::Pointer(PointerEvent::Up {
                position: Point::new(x, y),
            })],
            JsonInbound::AddSeat => command(DeskCommand::AddSeat),
            JsonInbound::ToggleSeat { id } => command(DeskCommand::ToggleSeat(id)),
            JsonInbound::RotateSeat { id } => command(DeskCommand::RotateSeat(id)),
            JsonInbound::RenameSeat { id, name } => command(DeskCommand::RenameSeat { id, name }),
            JsonInbound::SetSeatStyle { id, style } => {
                command(DeskCommand::SetSeatStyle { id, style })
            }
            JsonInbound::SetDefaultSeatStyle { style } => {
                command(DeskCommand::SetDefaultSeatStyle(style))
            }
            JsonInbound::SetTableShape { shape } => command(DeskCommand::SetTableShape(shape)),
            JsonInbound::SetTableOrientation { orientation } => {
                command(DeskCommand::SetTableOrientation(orientation))
            }
            JsonInbound::SetTableColor { color } => command(DeskCommand::SetTableColor(color)),
            JsonInbound::Telemetry { payload } => {
                let raw = match payload {
                    Value::String(raw) => raw,
                    other => other.to_string(),
                };
                vec![DeskEvent::Telemetry(raw)]
            }
            JsonInbound::Tick { ms } => vec![DeskEvent::Tick {
                elapsed: Duration::from_millis(ms),
            }],
            JsonInbound::Snapshot => Vec::new(),
            JsonInbound::Exit => command(DeskCommand::Exit),
        })
    }

    fn reply(&self, runtime: &DeskRuntime) -> Result<String, SocketDriverError> {
        let snapshot = runtime.snapshot();
        serde_json::to_string(&JsonOutbound::Snapshot {
            snapshot: &snapshot,
        })
        .map_err(|err| SocketDriverError::Decode(err.to_string()))
    }

    fn reject(&self, error: &SocketDriverError) -> String {
        let frame = JsonOutbound::Error {
            message: error.to_string(),
        };
        serde_json::to_string(&frame).unwrap_or_else(|_| r#"{"type":"error"}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpStream;
    use std::sync::mpsc;
    use std::thread;

    use crate::config::DeskConfig;
    use crate::persistence::MemoryStore;
    use crate::runtime::RuntimeConfig;

    fn decode(line: &str) -> Vec<DeskEvent> {
        let inbound: JsonInbound = serde_json::from_str(line).unwrap();
        JsonDeskStrategy.decode(inbound).unwrap()
    }

    #[test]
    fn pointer_frames_default_to_primary_button() {
        let events = decode(r#"{"type":"pointer_down","x":5,"y":6}"#);
        assert!(matches!(
            events.as_slice(),
            [DeskEvent::Pointer(PointerEvent::Down { button: PointerButton::Primary, position })]
                if *position == Point::new(5, 6)
        ));
    }

    #[test]
    fn telemetry_frames_accept_inline_and_string_payloads() {
        let inline = decode(r#"{"type":"telemetry","payload":{"seats":[]}}"#);
        assert!(matches!(inline.as_slice(), [DeskEvent::Telemetry(raw)] if raw == r#"{"seats":[]}"#));
        let encoded = decode(r#"{"type":"telemetry","payload":"{\"seats\":[]}"}"#);
        assert!(matches!(encoded.as_slice(), [DeskEvent::Telemetry(raw)] if raw == r#"{"seats":[]}"#));
    }

    #[test]
    fn command_frames_map_to_commands() {
        let events = decode(r#"{"type":"set_table_shape","shape":"oval"}"#);
        assert!(matches!(
            events.as_slice(),
            [DeskEvent::Command(DeskCommand::SetTableShape(TableShape::Oval))]
        ));
        assert!(decode(r#"{"type":"snapshot"}"#).is_empty());
    }

    #[test]
    fn session_over_tcp_replies_with_snapshots() {
        let store = MemoryStore::new();
        let server_store = store.clone();
        let (addr_tx, addr_rx) = mpsc::channel();

        let server = thread::spawn(move || {
            let runtime =
                DeskRuntime::new(DeskConfig::default(), server_store, RuntimeConfig::default())
                    .unwrap();
            let driver = SocketDriver::bind("127.0.0.1:0", runtime, JsonDeskStrategy).unwrap();
            addr_tx.send(driver.local_addr().unwrap()).unwrap();
            driver.run().unwrap();
        });

        let addr = addr_rx.recv().unwrap();
        let mut client = TcpStream::connect(addr).unwrap();
        let mut replies = BufReader::new(client.try_clone().unwrap()).lines();
        let mut send = |frame: &str| -> Value {
            client.write_all(frame.as_bytes()).unwrap();
            client.write_all(b"\n").unwrap();
            serde_json::from_str(&replies.next().unwrap().unwrap()).unwrap()
        };

        let reply = send(r#"{"type":"pointer_down","x":110,"y":60}"#);
        assert_eq!(reply["snapshot"]["interaction"], "dragging_seat");
        send(r#"{"type":"pointer_move","x":160,"y":110}"#);
        let reply = send(r#"{"type":"pointer_up","x":160,"y":110}"#);
        assert_eq!(reply["snapshot"]["seats"][0]["position"]["x"], 150);

        let reply = send("not json");
        assert_eq!(reply["type"], "error");

        let reply = send(r#"{"type":"telemetry","payload":{"seats":[{"id":3,"isOccupied":true}]}}"#);
        assert_eq!(reply["snapshot"]["activeSeatCount"], 1);

        send(r#"{"type":"exit"}"#);
        server.join().unwrap();

        let record: Value = serde_json::from_str(&store.get("deskLayout").unwrap()).unwrap();
        assert_eq!(record["seats"][0]["position"]["y"], 100);
    }
}
