use clap::Args;
use levelup_core::content::{standard_challenges, standard_quiz};
use levelup_core::{ContentKind, ContentPicker, EngineConfig};

use super::{now, open_engine, print_json, UserArgs};

#[derive(Args)]
pub struct DailyArgs {
    /// Show the daily quiz instead of the challenge list
    #[arg(long)]
    pub quiz: bool,
    #[command(flatten)]
    pub user: UserArgs,
}

pub fn run(args: DailyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load()?;
    let engine = open_engine()?;
    let user = args.user.user_id();
    let now = now()?;

    if args.quiz {
        let mut picker = ContentPicker::new(standard_quiz(), config.content.quiz);
        let content = engine.daily_content(&user, ContentKind::Quiz, &now, &mut picker)?;
        print_json(&content)
    } else {
        let mut picker = ContentPicker::new(standard_challenges(), config.content.daily_challenges);
        let content = engine.daily_content(&user, ContentKind::DailyChallenges, &now, &mut picker)?;
        print_json(&content)
    }
}
