//! Runtime configuration for the driver loop and the offline simulator.

use labyrinth_core::Dir;

/// Configuration of the turn loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BotConfig {
    /// Upper bound on the number of turns played.
    pub max_turns: u32,
    /// Move written when the agent has no direction to offer.
    pub fallback: Dir,
    /// Log the chosen path over the view every turn.
    pub render_paths: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            max_turns: 10_000,
            fallback: Dir::None,
            render_paths: false,
        }
    }
}

/// Parameters of a simulated labyrinth.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    pub cols: i32,
    pub rows: i32,
    /// Rounds allowed between reaching the control room and the entry.
    pub alarm: i32,
    /// Total number of moves before the avatar runs out of fuel.
    pub fuel: u32,
    /// Cells within this Chebyshev distance of the avatar are revealed.
    pub view_radius: i32,
    /// Share of the interior carved into floor by the generator (0.0–1.0).
    pub fill_pct: f64,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cols: 30,
            rows: 15,
            alarm: 60,
            fuel: 1200,
            view_radius: 2,
            fill_pct: 0.45,
            seed: 0,
        }
    }
}

impl SimConfig {
    /// Smallest map that still has a 2x2 interior inside its border walls.
    pub const MIN_SIDE: i32 = 4;
    /// Largest side; a full-size map has as many cells as a protocol header
    /// may announce.
    pub const MAX_SIDE: i32 = 1024;

    /// A copy with every field clamped into its usable range.
    pub fn normalized(&self) -> Self {
        Self {
            cols: self.cols.clamp(Self::MIN_SIDE, Self::MAX_SIDE),
            rows: self.rows.clamp(Self::MIN_SIDE, Self::MAX_SIDE),
            alarm: self.alarm.max(0),
            fuel: self.fuel,
            view_radius: self.view_radius.max(1),
            fill_pct: self.fill_pct.clamp(0.0, 1.0),
            seed: self.seed,
        }
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn sim_config_round_trip() {
        let c = SimConfig {
            seed: 42,
            ..SimConfig::default()
        };
        let json = serde_json::to_string(&c).unwrap();
        let back: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
