mod alliance;
mod conflict;
mod economy;
mod investment;
mod legitimacy;
mod power;
mod region;
mod research;
mod system;
mod trade;
mod war;

pub use alliance::AllianceSystem;
pub use conflict::ConflictSystem;
pub use economy::EconomySystem;
pub use investment::InvestmentSystem;
pub use legitimacy::LegitimacySystem;
pub use power::PowerSystem;
pub use region::RegionSystem;
pub use research::ResearchSystem;
pub use system::{Subsystem, TickContext};
pub use trade::TradeSystem;
pub use war::WarSystem;

/// The fixed pipeline: passive evolution first, diplomatic and military
/// interaction next, investment, and the destructive transitions last so
/// same-tick collapses use post-war state.
pub fn default_pipeline() -> Vec<Box<dyn Subsystem>> {
    vec![
        Box::new(RegionSystem),
        Box::new(PowerSystem),
        Box::new(EconomySystem),
        Box::new(LegitimacySystem),
        Box::new(AllianceSystem),
        Box::new(WarSystem),
        Box::new(ResearchSystem),
        Box::new(TradeSystem),
        Box::new(InvestmentSystem),
        Box::new(ConflictSystem),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_order_is_fixed() {
        let names: Vec<&str> = default_pipeline().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "region",
                "power",
                "economy",
                "legitimacy",
                "alliance",
                "war",
                "research",
                "trade",
                "investment",
                "conflict",
            ]
        );
    }
}
