//! Trajectory recording and export.
//!
//! The core exposes per-step state; this recorder copies it into frames
//! an external writer can persist. The only serialization offered here
//! is a JSON export of the recorded frames.

use mdk_model::{SystemState, TypeArena};
use serde::{Deserialize, Serialize};

/// One recorded step: energies plus per-type flat kinematic arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// Elapsed simulated time.
    pub time: f64,
    /// Completed step count.
    pub step: u64,
    /// Total energy.
    pub energy_total: f64,
    /// Potential energy.
    pub energy_potential: f64,
    /// Kinetic energy per type.
    pub energy_kinetic: Vec<f64>,
    /// Instantaneous temperature per type.
    pub temperature: Vec<f64>,
    /// COM positions per type, flat (molecule, dim) layout.
    pub position: Vec<Vec<f64>>,
    /// COM velocities per type, same layout.
    pub velocity: Vec<Vec<f64>>,
}

/// Records per-step frames of the simulation state.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryRecorder {
    /// Recorded frames in step order.
    pub frames: Vec<Frame>,
}

impl TrajectoryRecorder {
    /// Create a new empty trajectory recorder.
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Record the current state.
    pub fn record(&mut self, state: &SystemState, arenas: &[TypeArena]) {
        self.frames.push(Frame {
            time: state.time,
            step: state.step,
            energy_total: state.energy_total,
            energy_potential: state.energy_potential,
            energy_kinetic: state.energy_kinetic.clone(),
            temperature: state.temperature.clone(),
            position: arenas.iter().map(|a| a.position.clone()).collect(),
            velocity: arenas.iter().map(|a| a.velocity.clone()).collect(),
        });
    }

    /// Number of frames recorded.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if the recorder is empty.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Clear all recorded frames.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Export to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(step: u64) -> (SystemState, Vec<TypeArena>) {
        let mut state = SystemState::new(1, 2);
        state.step = step;
        state.time = step as f64 * 0.1;
        state.energy_total = 1.0;
        let mut arena = TypeArena::new(2, 2, 1).unwrap();
        arena.position[0] = step as f64;
        (state, vec![arena])
    }

    #[test]
    fn test_recording() {
        let mut recorder = TrajectoryRecorder::new();
        for i in 0..5 {
            let (state, arenas) = sample(i);
            recorder.record(&state, &arenas);
        }
        assert_eq!(recorder.len(), 5);
        assert_eq!(recorder.frames[3].step, 3);
        assert_eq!(recorder.frames[3].position[0][0], 3.0);
    }

    #[test]
    fn test_clear() {
        let mut recorder = TrajectoryRecorder::new();
        let (state, arenas) = sample(0);
        recorder.record(&state, &arenas);
        assert!(!recorder.is_empty());
        recorder.clear();
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_to_json() {
        let mut recorder = TrajectoryRecorder::new();
        let (state, arenas) = sample(1);
        recorder.record(&state, &arenas);
        let json = recorder.to_json().unwrap();
        assert!(json.contains("\"energy_total\""));
        assert!(json.contains("\"position\""));
    }
}
