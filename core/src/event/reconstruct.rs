//! End-of-event reconstruction of scattering angle and momentum loss.
//!
//! Planes 0 and 1 sit upstream of the target, planes 2 and 3 downstream.
//! The straight segments through each pair give the incoming and outgoing
//! directions; the momenta recorded at planes 1 and 2 bracket the target.

use crate::event::accumulator::{TrackerHit, TRACKER_PLANES};
use crate::math::kinematics::{projected_angle, safe_direction, space_angle};

/// Reconstructed quantities for one event, in internal units
/// (radian, MeV, mm).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputRow {
    pub theta_3d: f64,
    pub theta_x: f64,
    pub theta_y: f64,
    pub p_in: f64,
    pub p_out: f64,
    pub delta_p: f64,
    pub x_target: f64,
    pub y_target: f64,
    pub calo_edep: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateSegment {
    /// Planes 0 and 1 recorded the same position.
    Incoming,
    /// Planes 2 and 3 recorded the same position.
    Outgoing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventOutcome {
    Accepted(OutputRow),
    /// At least one plane saw no hit; the event is dropped silently.
    Incomplete,
    /// A track segment had no length; the event is dropped and counted.
    Degenerate(DegenerateSegment),
}

impl EventOutcome {
    pub fn row(&self) -> Option<&OutputRow> {
        match self {
            EventOutcome::Accepted(row) => Some(row),
            _ => None,
        }
    }
}

pub fn reconstruct(hits: &[TrackerHit; TRACKER_PLANES], calo_edep: f64) -> EventOutcome {
    if !hits.iter().all(|h| h.recorded) {
        return EventOutcome::Incomplete;
    }

    let Some(incoming) = safe_direction(&(hits[1].position - hits[0].position)) else {
        return EventOutcome::Degenerate(DegenerateSegment::Incoming);
    };
    let Some(outgoing) = safe_direction(&(hits[3].position - hits[2].position)) else {
        return EventOutcome::Degenerate(DegenerateSegment::Outgoing);
    };

    let theta_3d = space_angle(&incoming, &outgoing);
    let theta_x = projected_angle(incoming.x, incoming.z, outgoing.x, outgoing.z);
    let theta_y = projected_angle(incoming.y, incoming.z, outgoing.y, outgoing.z);

    let p_in = hits[1].momentum.norm();
    let p_out = hits[2].momentum.norm();

    // Midpoint of the two planes nearest the target stands in for the
    // unknown scattering vertex.
    let x_target = (hits[1].position.x + hits[2].position.x) / 2.0;
    let y_target = (hits[1].position.y + hits[2].position.y) / 2.0;

    EventOutcome::Accepted(OutputRow {
        theta_3d,
        theta_x,
        theta_y,
        p_in,
        p_out,
        delta_p: p_in - p_out,
        x_target,
        y_target,
        calo_edep,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Vec3;

    fn hit(x: f64, y: f64, z: f64, p: f64) -> TrackerHit {
        TrackerHit {
            position: Vec3::new(x, y, z),
            momentum: Vec3::new(0.0, 0.0, p),
            recorded: true,
        }
    }

    #[test]
    fn missing_plane_is_incomplete() {
        let mut hits = [hit(0.0, 0.0, -500.0, 3000.0); 4];
        hits[3].recorded = false;
        assert_eq!(reconstruct(&hits, 0.0), EventOutcome::Incomplete);
    }

    #[test]
    fn coincident_hits_are_degenerate() {
        let hits = [
            hit(0.0, 0.0, -500.0, 3000.0),
            hit(0.0, 0.0, -500.0, 3000.0),
            hit(0.0, 0.0, 250.0, 2990.0),
            hit(0.0, 0.0, 500.0, 2990.0),
        ];
        assert_eq!(
            reconstruct(&hits, 0.0),
            EventOutcome::Degenerate(DegenerateSegment::Incoming)
        );

        let hits = [
            hit(0.0, 0.0, -500.0, 3000.0),
            hit(0.0, 0.0, -250.0, 3000.0),
            hit(1.0, 0.0, 250.0, 2990.0),
            hit(1.0, 0.0, 250.0, 2990.0),
        ];
        assert_eq!(
            reconstruct(&hits, 0.0),
            EventOutcome::Degenerate(DegenerateSegment::Outgoing)
        );
    }

    #[test]
    fn kink_in_x_gives_signed_projected_angle() {
        // Outgoing segment rises 1 mm in x over 250 mm.
        let hits = [
            hit(0.0, 0.0, -500.0, 3000.0),
            hit(0.0, 0.0, -250.0, 3000.0),
            hit(0.0, 0.0, 250.0, 2980.0),
            hit(1.0, 0.0, 500.0, 2980.0),
        ];
        let row = *reconstruct(&hits, 5.0).row().unwrap();
        let expected = (1.0_f64 / 250.0).atan();
        assert!((row.theta_x - expected).abs() < 1e-12);
        assert!((row.theta_3d - expected).abs() < 1e-12);
        assert_eq!(row.theta_y, 0.0);
        assert!((row.delta_p - 20.0).abs() < 1e-9);
        assert_eq!(row.calo_edep, 5.0);

        let mirrored = [hits[0], hits[1], hits[2], hit(-1.0, 0.0, 500.0, 2980.0)];
        let row = *reconstruct(&mirrored, 0.0).row().unwrap();
        assert!((row.theta_x + expected).abs() < 1e-12);
    }

    #[test]
    fn backscatter_resolves_to_pi() {
        let hits = [
            hit(0.0, 0.0, -500.0, 3000.0),
            hit(0.0, 0.0, -250.0, 3000.0),
            hit(0.0, 0.0, 250.0, 100.0),
            hit(0.0, 0.0, -250.0, 100.0),
        ];
        let row = *reconstruct(&hits, 0.0).row().unwrap();
        assert_eq!(row.theta_3d, std::f64::consts::PI);
    }
}
