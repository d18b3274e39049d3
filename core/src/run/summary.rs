use crate::event::EventOutcome;
use crate::math::stats::RunningStats;
use crate::math::units::{MEV, MRAD};

/// Per-run tallies and moments of the reconstructed quantities.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    pub events: u64,
    pub incomplete: u64,
    pub degenerate: u64,
    pub theta_3d: RunningStats,
    pub theta_x: RunningStats,
    pub theta_y: RunningStats,
    pub delta_p: RunningStats,
    pub calo_edep: RunningStats,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &EventOutcome) {
        self.events += 1;
        match outcome {
            EventOutcome::Accepted(row) => {
                self.theta_3d.push(row.theta_3d);
                self.theta_x.push(row.theta_x);
                self.theta_y.push(row.theta_y);
                self.delta_p.push(row.delta_p);
                self.calo_edep.push(row.calo_edep);
            }
            EventOutcome::Incomplete => self.incomplete += 1,
            EventOutcome::Degenerate(_) => self.degenerate += 1,
        }
    }

    pub fn accepted(&self) -> u64 {
        self.theta_3d.count()
    }

    pub fn merge(&mut self, other: &RunSummary) {
        self.events += other.events;
        self.incomplete += other.incomplete;
        self.degenerate += other.degenerate;
        self.theta_3d.merge(&other.theta_3d);
        self.theta_x.merge(&other.theta_x);
        self.theta_y.merge(&other.theta_y);
        self.delta_p.merge(&other.delta_p);
        self.calo_edep.merge(&other.calo_edep);
    }

    /// One-line digest for the run log.
    pub fn describe(&self) -> String {
        format!(
            "events {} accepted {} incomplete {} degenerate {} | thetaX rms {:.4} mrad, thetaY rms {:.4} mrad, <deltaP> {:.3} MeV, <caloEdep> {:.3} MeV",
            self.events,
            self.accepted(),
            self.incomplete,
            self.degenerate,
            self.theta_x.rms() / MRAD,
            self.theta_y.rms() / MRAD,
            self.delta_p.mean() / MEV,
            self.calo_edep.mean() / MEV,
        )
    }
}
