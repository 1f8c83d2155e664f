#[macro_use]
extern crate rocket;

use rocket::{
    figment::{
        providers::{Format, Toml},
        Figment,
    },
    Build, Rocket,
};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "autoassist-bin",
    about = "The API server for AutoAssist, a workshop, towing and car parts service"
)]
struct AutoAssistOpts {
    /// Path to the TOML configuration file.
    #[structopt(short, long, parse(from_os_str))]
    config: PathBuf,
}

#[launch]
fn rocket() -> Rocket<Build> {
    let args: AutoAssistOpts = AutoAssistOpts::from_args();

    // This helps us manage run-time Rocket.toml easily
    let figment = Figment::from(rocket::Config::default()).merge(Toml::file(args.config).nested());

    autoassist_bin::build(figment)
}
