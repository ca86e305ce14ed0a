use clap::Subcommand;
use levelup_core::{CapKind, CompletionOutcome};

use super::{now, open_engine, print_json, UserArgs};

#[derive(Subcommand)]
pub enum ChallengeAction {
    /// Record a completed challenge and award its points
    Complete {
        /// Base points of the challenge
        points: u64,
        /// Count against the quiz cap instead of the challenge cap
        #[arg(long)]
        quiz: bool,
        #[command(flatten)]
        user: UserArgs,
    },
    /// Completions left today
    Remaining {
        #[arg(long)]
        quiz: bool,
        #[command(flatten)]
        user: UserArgs,
    },
}

fn cap_kind(quiz: bool) -> CapKind {
    if quiz {
        CapKind::Quiz
    } else {
        CapKind::Challenges
    }
}

pub fn run(action: ChallengeAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine()?;
    let now = now()?;

    match action {
        ChallengeAction::Complete { points, quiz, user } => {
            let outcome = engine.complete_challenge(&user.user_id(), cap_kind(quiz), points, &now)?;
            print_json(&outcome)?;
            if let CompletionOutcome::CapReached { kind, cap, .. } = outcome {
                return Err(format!("daily {kind} limit of {cap} reached, come back tomorrow").into());
            }
        }
        ChallengeAction::Remaining { quiz, user } => {
            let remaining = engine.remaining_today(&user.user_id(), cap_kind(quiz), &now)?;
            println!("{remaining}");
        }
    }
    Ok(())
}
