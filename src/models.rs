use crate::session::HudInfo;

pub struct GameRenderState {
    pub board: String,
    pub hud: HudInfo,
    /// Message about the last move, if any.
    pub status: Option<String>,
    pub ended: bool,
}
