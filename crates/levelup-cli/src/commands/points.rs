use clap::Subcommand;

use super::{now, open_engine, print_json, UserArgs};

#[derive(Subcommand)]
pub enum PointsAction {
    /// Show the point total
    Show(UserArgs),
    /// Award points (level bonus applied)
    Award {
        /// Base points before the level bonus
        points: u64,
        #[command(flatten)]
        user: UserArgs,
    },
    /// Overwrite the point total (may lower it)
    Reset {
        /// New total
        #[arg(default_value_t = 0)]
        points: u64,
        #[command(flatten)]
        user: UserArgs,
    },
}

pub fn run(action: PointsAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine()?;

    match action {
        PointsAction::Show(user) => {
            let total = engine.repository().total_points(&user.user_id())?;
            println!("{total}");
        }
        PointsAction::Award { points, user } => {
            let award = engine.award_points(&user.user_id(), points)?;
            print_json(&award)?;
        }
        PointsAction::Reset { points, user } => {
            let outcome = engine.reset_points(&user.user_id(), points, &now()?)?;
            let reset = outcome.reset;
            if reset.is_regression() {
                eprintln!("points lowered from {} to {}", reset.previous, reset.current);
            }
            println!("{}", reset.current);
        }
    }
    Ok(())
}
