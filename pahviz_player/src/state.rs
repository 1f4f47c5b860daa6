//! Request/response protocol and the state the frame loop and stdin reader share.

use std::path::PathBuf;

use pahviz::observer::{SessionAdapter, SessionSnapshot};
use pahviz::svg::export_svg;
use pahviz::{SceneHandler, Session};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DEFAULT_FPS: u32 = 60;

// ═══════════════════════════════════════════════════════════════════════════
// Protocol Messages
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    GetState,
    Advance,
    Hover { id: String },
    Click { id: String },
    ExportSvg { path: Option<String> },
    SetFramerate { fps: u32 },
    Reset,
    Shutdown,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Response {
    State {
        frame: u64,
        target_fps: u32,
        session: SessionSnapshot,
    },
    Success { message: String },
    Error { message: String },
}

impl Response {
    fn success(message: impl Into<String>) -> Self {
        Response::Success { message: message.into() }
    }

    fn error(message: impl std::fmt::Display) -> Self {
        Response::Error { message: message.to_string() }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Player State
// ═══════════════════════════════════════════════════════════════════════════

pub struct PlayerState {
    pub session: Session,
    pub frame: u64,
    pub target_fps: u32,
    pub shutdown_requested: bool,
    svg_file: PathBuf,
}

impl PlayerState {
    pub fn new(session: Session, svg_file: PathBuf) -> Self {
        Self {
            session,
            frame: 0,
            target_fps: DEFAULT_FPS,
            shutdown_requested: false,
            svg_file,
        }
    }

    pub fn frame_millis(&self) -> u64 {
        (1000 / self.target_fps.max(1)).max(1) as u64
    }

    /// One animation frame.
    pub fn tick(&mut self) {
        let dt = self.frame_millis() as f64;
        self.session.tick(dt);
        self.frame += 1;
    }

    pub fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::GetState => Response::State {
                frame: self.frame,
                target_fps: self.target_fps,
                session: SessionAdapter::new(&self.session).snapshot(),
            },
            Request::Advance => match self.session.on_advance() {
                Ok(_) => Response::success(self.session.status()),
                Err(e) => Response::error(e),
            },
            Request::Hover { id } => match self.session.on_entity_hover(&id) {
                Ok(text) => Response::success(text),
                Err(e) => Response::error(e),
            },
            Request::Click { id } => match self.session.on_entity_click(&id) {
                Ok(text) => Response::success(text),
                Err(e) => Response::error(e),
            },
            Request::ExportSvg { path } => {
                let path = path.map(PathBuf::from).unwrap_or_else(|| self.svg_file.clone());
                match export_svg(self.session.scene(), &path) {
                    Ok(()) => {
                        info!("SVG exported to {:?}", path);
                        Response::success(format!("Exported {}", path.display()))
                    }
                    Err(e) => {
                        warn!("SVG export failed: {}", e);
                        Response::error(format!("Export failed: {}", e))
                    }
                }
            }
            Request::SetFramerate { fps } => {
                let clamped = fps.clamp(1, 240);
                self.target_fps = clamped;
                info!("Framerate set to {} FPS", clamped);
                Response::success(format!("Framerate set to {} FPS", clamped))
            }
            Request::Reset => match self.session.reset() {
                Ok(()) => {
                    self.frame = 0;
                    Response::success(self.session.status())
                }
                Err(e) => Response::error(e),
            },
            Request::Shutdown => {
                self.shutdown_requested = true;
                Response::success("Shutting down")
            }
        }
    }

    /// Parses one JSON line and handles it; malformed input becomes an error response.
    pub fn handle_line(&mut self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request),
            Err(e) => Response::error(format!("Invalid request: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pahviz::config::TimingConfig;
    use pahviz::{SessionConfig, TaskDataset};

    fn state() -> PlayerState {
        let config = SessionConfig::default()
            .with_seed(3)
            .with_timing(TimingConfig::instant());
        let session = Session::new(config, TaskDataset::builtin_cifar()).unwrap();
        let svg = std::env::temp_dir().join(format!("pahviz_player_{}.svg", std::process::id()));
        PlayerState::new(session, svg)
    }

    fn message(resp: &Response) -> &str {
        match resp {
            Response::Success { message } | Response::Error { message } => message,
            Response::State { .. } => panic!("unexpected state response"),
        }
    }

    #[test]
    fn parses_tagged_requests() {
        let req: Request = serde_json::from_str(r#"{"type":"Click","id":"hard-loss"}"#).unwrap();
        assert_eq!(req, Request::Click { id: "hard-loss".into() });

        let req: Request = serde_json::from_str(r#"{"type":"ExportSvg","path":null}"#).unwrap();
        assert_eq!(req, Request::ExportSvg { path: None });

        let req: Request = serde_json::from_str(r#"{"type":"SetFramerate","fps":30}"#).unwrap();
        assert_eq!(req, Request::SetFramerate { fps: 30 });
    }

    #[test]
    fn advance_until_exhausted() {
        let mut s = state();
        for n in 1..=4 {
            let resp = s.handle(Request::Advance);
            assert!(message(&resp).starts_with(&format!("Trained Task #{n}")));
        }
        let resp = s.handle(Request::Advance);
        assert_eq!(message(&resp), pahviz::session::EXHAUSTED_MESSAGE);
        assert_eq!(s.session.store().len(), 8);
    }

    #[test]
    fn click_and_unknown_entity() {
        let mut s = state();
        let resp = s.handle_line(r#"{"type":"Click","id":"hard-loss"}"#);
        assert!(matches!(resp, Response::Success { .. }));
        assert!(message(&resp).contains("cross-entropy"));

        let resp = s.handle(Request::Hover { id: "nope".into() });
        assert!(matches!(resp, Response::Error { .. }));
    }

    #[test]
    fn malformed_line_is_an_error_response() {
        let mut s = state();
        let resp = s.handle_line("{not json");
        assert!(message(&resp).starts_with("Invalid request"));
    }

    #[test]
    fn framerate_is_clamped_and_drives_frame_length() {
        let mut s = state();
        s.handle(Request::SetFramerate { fps: 0 });
        assert_eq!(s.target_fps, 1);
        assert_eq!(s.frame_millis(), 1000);
        s.handle(Request::SetFramerate { fps: 10_000 });
        assert_eq!(s.target_fps, 240);
        assert_eq!(s.frame_millis(), 4);
    }

    #[test]
    fn state_response_serializes_with_tag() {
        let mut s = state();
        s.handle(Request::Advance);
        s.tick();
        let json = serde_json::to_value(s.handle(Request::GetState)).unwrap();
        assert_eq!(json["type"], "State");
        assert_eq!(json["frame"], 1);
        assert_eq!(json["session"]["prototype_count"], 2);
    }

    #[test]
    fn export_and_shutdown() {
        let mut s = state();
        let resp = s.handle(Request::ExportSvg { path: None });
        assert!(matches!(resp, Response::Success { .. }));
        let body = std::fs::read_to_string(&s.svg_file).unwrap();
        assert!(body.starts_with("<svg"));
        let _ = std::fs::remove_file(&s.svg_file);

        s.handle(Request::Shutdown);
        assert!(s.shutdown_requested);
    }

    #[test]
    fn reset_restarts_the_session() {
        let mut s = state();
        s.handle(Request::Advance);
        s.tick();
        let resp = s.handle(Request::Reset);
        assert_eq!(message(&resp), pahviz::session::READY_MESSAGE);
        assert_eq!(s.frame, 0);
        assert_eq!(s.session.task_index(), 0);
    }
}
