use super::{now, open_engine, print_json, UserArgs};

pub fn run(args: UserArgs) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine()?;
    let streak = engine.streak(&args.user_id(), &now()?)?;
    print_json(&streak)
}
