use clap::Args;
use levelup_core::EngineConfig;

use super::{open_engine, print_json, UserArgs};

#[derive(Args)]
pub struct LevelArgs {
    #[command(flatten)]
    pub user: UserArgs,
    /// Compute the level for a point total instead of a stored user
    #[arg(long, allow_negative_numbers = true)]
    pub points: Option<i64>,
}

pub fn run(args: LevelArgs) -> Result<(), Box<dyn std::error::Error>> {
    let info = match args.points {
        Some(points) => {
            let calculator = EngineConfig::load()?.level_calculator();
            calculator.info(levelup_core::level::sanitize_points(points))
        }
        None => open_engine()?.level_info(&args.user.user_id())?,
    };
    print_json(&info)
}
