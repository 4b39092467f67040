//! Dev-environment seeding CLI, grounded on `seeder::main` from the
//! teacher repo: clap-parsed args, a colored banner, a migrated pool, then
//! a seeded RNG driving the insert loop.

mod data;

use clap::Parser;
use colored::Colorize;
use rand::SeedableRng;
use sqlx::postgres::PgPoolOptions;

#[derive(Parser, Debug)]
#[command(about = "Seeds the BNPL gateway database with synthetic decisions for local development")]
struct Args {
    #[arg(long, default_value_t = 25)]
    count: u32,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    println!("{}", "BNPL gateway seeder".bold().green());
    println!("seeding {} synthetic decisions", args.count);

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&args.database_url)
        .await?;

    sqlx::migrate!("../database/migrations").run(&pool).await?;

    let mut rng = match args.seed {
        Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
        None => rand::rngs::StdRng::from_entropy(),
    };

    data::create_decisions_with_plans(&pool, &mut rng, args.count).await?;

    println!("{}", "done".bold().green());
    Ok(())
}
