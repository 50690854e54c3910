pub mod patterns;
pub mod summary;

pub use patterns::{
    analyze, analyze_patterns, average_energy, avoidance_patterns, burnout_risk, category_balance,
    completion_rate, energy_trends, ANALYSIS_WINDOW_DAYS,
};
pub use summary::data_summary;
