//! Placement service — validates, rate-limits, commits and announces pixels.
//!
//! DESIGN
//! ======
//! All four request fields are validated independently so a rejected
//! request reports every bad field at once. Only a fully valid request
//! reaches the cooldown gate, and a cooldown rejection is reported alone.
//!
//! ATOMICITY
//! =========
//! The identity write lock is held from token validation until the
//! broadcast has been queued, and the grid write lock from commit until
//! then as well. Two placements can never both read the same stale
//! `last_placement`, and viewers connecting concurrently see a placement
//! either in their snapshot or as an update, never both or neither.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, info};

use crate::config::PALETTE_SIZE;
use crate::event::Event;
use crate::services::grid::Pixel;
use crate::state::AppState;
use crate::validate::{FieldError, validate_color, validate_coord, validate_token};

// =============================================================================
// TYPES
// =============================================================================

/// Raw `/put-pixel` query parameters, exactly as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlacementRequest {
    pub token: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Token,
    X,
    Y,
    Color,
}

impl Field {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::X => "x",
            Self::Y => "y",
            Self::Color => "color",
        }
    }
}

/// One rejected field. `range` is the accepted half-open interval for
/// numeric fields and is echoed back to the client as a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: Field,
    pub error: FieldError,
    pub range: Option<(i64, i64)>,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid or missing parameter '{}'.", self.field.name())?;
        if let Some((min, max)) = self.range {
            write!(f, " Must be an integer from {min} to {max}.")?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("{} invalid field(s)", .0.len())]
    InvalidFields(Vec<FieldViolation>),
    #[error("Cooldown {:.1}s.", .remaining.as_secs_f64())]
    CooldownActive { remaining: Duration },
}

impl PlacementError {
    /// User-facing messages, one per problem.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::InvalidFields(violations) => violations.iter().map(ToString::to_string).collect(),
            Self::CooldownActive { .. } => vec![self.to_string()],
        }
    }
}

// =============================================================================
// PLACE
// =============================================================================

/// Validate and commit one placement, then broadcast it to every viewer.
///
/// # Errors
///
/// Returns `InvalidFields` listing every rejected field, or `CooldownActive`
/// if the session placed a pixel less than the configured cooldown ago.
/// Neither error mutates any state.
pub async fn place_pixel(state: &AppState, req: &PlacementRequest) -> Result<Pixel, PlacementError> {
    place_pixel_at(state, req, Instant::now()).await
}

/// Internal: place with an explicit timestamp (for testing).
pub(crate) async fn place_pixel_at(
    state: &AppState,
    req: &PlacementRequest,
    now: Instant,
) -> Result<Pixel, PlacementError> {
    let size = state.config.canvas_size;
    let coord_range = Some((0, i64::from(size)));
    let color_range = Some((0, i64::from(PALETTE_SIZE)));

    let mut identity = state.identity.write().await;

    let token = validate_token(req.token.as_deref(), &identity).map(|s| s.token.clone());
    let x = validate_coord(req.x.as_deref(), size);
    let y = validate_coord(req.y.as_deref(), size);
    let color = validate_color(req.color.as_deref());

    let (token, x, y, color) = match (token, x, y, color) {
        (Ok(token), Ok(x), Ok(y), Ok(color)) => (token, x, y, color),
        (token, x, y, color) => {
            let violations: Vec<FieldViolation> = [
                (Field::Token, token.err(), None),
                (Field::X, x.err(), coord_range),
                (Field::Y, y.err(), coord_range),
                (Field::Color, color.err(), color_range),
            ]
            .into_iter()
            .filter_map(|(field, error, range)| error.map(|error| FieldViolation { field, error, range }))
            .collect();
            debug!(count = violations.len(), "placement rejected: invalid fields");
            return Err(PlacementError::InvalidFields(violations));
        }
    };

    let Some(session) = identity.lookup_mut(&token) else {
        return Err(PlacementError::InvalidFields(vec![FieldViolation {
            field: Field::Token,
            error: FieldError::UnknownToken,
            range: None,
        }]));
    };

    if let Some(remaining) = cooldown_remaining(session.last_placement, now, state.config.cooldown) {
        debug!(name = %session.name, ?remaining, "placement rejected: cooldown");
        return Err(PlacementError::CooldownActive { remaining });
    }

    let pixel = Pixel { x, y, color, owner: session.name.clone() };

    let mut grid = state.grid.write().await;
    grid.set(x, y, color, pixel.owner.clone());
    session.last_placement = Some(now);

    let delivered = state.broadcaster.publish(&Event::Update(pixel.clone())).await;
    drop(grid);

    info!(name = %pixel.owner, x, y, color, delivered, "pixel placed");
    Ok(pixel)
}

/// Time left before a session may place again, or `None` if it may place now.
/// A session that never placed is always allowed.
#[must_use]
pub fn cooldown_remaining(last_placement: Option<Instant>, now: Instant, cooldown: Duration) -> Option<Duration> {
    let last = last_placement?;
    let elapsed = now.saturating_duration_since(last);
    (elapsed < cooldown).then(|| cooldown - elapsed)
}

#[cfg(test)]
#[path = "placement_test.rs"]
mod tests;
