use anyhow::Result;
use clap::{App, Arg};
use quern::config::Config;
use quern::repo::Repository;
use quern::{build, log, serve};
use std::path::PathBuf;

fn main() -> Result<()> {
    let matches = App::new("quern")
        .version(clap::crate_version!())
        .about("A static blog generator with live preview and Atom feeds")
        .arg(
            Arg::with_name("command")
                .possible_values(&["build", "serve", "run", "debug"])
                .default_value("debug")
                .help(
                    "build  - freeze the site into DIRECTORY\n\
                     serve  - serve a previously built DIRECTORY\n\
                     run    - build and then serve the site\n\
                     debug  - preview server with live reload and drafts",
                ),
        )
        .arg(
            Arg::with_name("directory")
                .default_value("build")
                .help("the directory in which to build the site"),
        )
        .arg(
            Arg::with_name("port")
                .short("p")
                .long("port")
                .takes_value(true)
                .default_value("8000")
                .help("the port the serve/run/debug servers listen on"),
        )
        .get_matches();

    let config = Config::from_directory(&std::env::current_dir()?)?;
    let directory = PathBuf::from(matches.value_of("directory").unwrap());
    let port: u16 = matches.value_of("port").unwrap().parse()?;

    match matches.value_of("command").unwrap() {
        "build" => {
            let repo = Repository::new(&config.posts_directory, &config.posts_extension, false);
            build::build_site(&repo, &config, &directory)?;
            log!("build"; "site built into {}", directory.display());
        }
        "serve" => serve::serve_static(&directory, port)?,
        "run" => {
            let repo = Repository::new(&config.posts_directory, &config.posts_extension, false);
            build::build_site(&repo, &config, &directory)?;
            serve::serve_static(&directory, port)?;
        }
        _ => {
            let repo = Repository::new(&config.posts_directory, &config.posts_extension, true);
            let discovered = repo.discover_all();
            log!("quern"; "discovered {} posts under {}", discovered, config.posts_directory.display());
            serve::serve_live(&repo, &config, port)?;
        }
    }

    Ok(())
}
