//! Reward and experience formulas.
//!
//! These are pure and total: they never fail and never consult external state.
//! Currency and level bookkeeping belong to the economy facade.

use crate::zone::{Zone, ZoneKind};

/// Share of the base reward granted as experience.
const EXPERIENCE_RATIO: f64 = 0.1;

pub fn compute_harvest_reward(base_reward: f64, booster_multiplier: f64) -> f64 {
    base_reward * booster_multiplier
}

pub fn experience_multiplier(kind: &ZoneKind) -> f64 {
    match kind {
        ZoneKind::Mining => 1.2,
        ZoneKind::Farming => 1.0,
        ZoneKind::Custom => 0.8,
        ZoneKind::Other(_) => 1.0,
    }
}

/// Experience for one harvest in `zone`; zero when the zone grants none.
pub fn compute_experience(zone: &Zone) -> f64 {
    if !zone.grants_experience() {
        return 0.0;
    }

    zone.base_reward * EXPERIENCE_RATIO * experience_multiplier(&zone.kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ZoneDefinition;
    use crate::zone::ZoneFlags;

    fn zone(kind: &str, base_reward: f64) -> Zone {
        Zone::from_definition(ZoneDefinition {
            id: "z".to_owned(),
            kind: kind.to_owned(),
            base_reward,
            ..ZoneDefinition::default()
        })
        .unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn experience_by_kind() {
        assert_close(compute_experience(&zone("MINING", 100.0)), 12.0);
        assert_close(compute_experience(&zone("FARMING", 100.0)), 10.0);
        assert_close(compute_experience(&zone("CUSTOM", 100.0)), 8.0);
        assert_close(compute_experience(&zone("FISHING", 100.0)), 10.0);
    }

    #[test]
    fn no_experience_when_disabled() {
        for kind in ["MINING", "FARMING", "CUSTOM", "FISHING"] {
            let mut zone = zone(kind, 5000.0);
            zone.flags.remove(ZoneFlags::GRANT_EXPERIENCE);
            assert_eq!(compute_experience(&zone), 0.0);
        }
    }

    #[test]
    fn reward_scales_with_booster() {
        assert_close(compute_harvest_reward(100.0, 1.0), 100.0);
        assert_close(compute_harvest_reward(100.0, 2.5), 250.0);
        assert_close(compute_harvest_reward(0.0, 3.0), 0.0);
    }
}
