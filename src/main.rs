use clap::Parser;
use spatialize::{config::Config, flow};

fn main() -> anyhow::Result<()> {
    flow::run(Config::parse())
}
