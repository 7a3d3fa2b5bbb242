use std::fmt;

use anyhow::{bail, Result};
use inquire::{validator::Validation, Confirm, CustomType, CustomUserError, Select, Text};
use tracing::{error, info, warn};

use crate::{
    generate::{TextGenerator, Topic},
    locate,
    nominatim::Location,
    pipeline, report,
    utils::spinner,
    Services, DEFAULT_RADIUS,
};

const ADDRESS_ATTEMPTS: usize = 5;

const ADDRESS_EXAMPLES: &str = "
    Here are some examples of how you can enter your location:

        Standard address: 123 State St, Ann Arbor, MI 48104
        Street name and city: State Street, Ann Arbor
        City and state: Ann Arbor, MI
        City only: Ann Arbor
        County and state: Washtenaw County, MI
        City and country: Ann Arbor, USA
        Country: USA

    Less specific addresses give less accurate locations. Any location worldwide should work.
";

#[derive(Clone, Copy)]
enum Source {
    Ip,
    Manual,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip => write!(f, "Automatically detect location (using IP address)"),
            Self::Manual => write!(f, "Manually enter location"),
        }
    }
}

pub fn run(services: &Services) -> Result<()> {
    println!(
        "\nWelcome to EcoPOI!\n\n\
        EcoPOI gathers information about the local flora, fauna and ecosystem of a location,\n\
        along with nearby nature spots, from dog parks to streams to volcanoes.\n"
    );

    let location = choose_location(services)?;
    println!("\nLocation: {}", location.address);

    match &services.generator {
        Some(generator) => describe(generator, &location)?,
        None => info!("no text completion key configured, skipping descriptions"),
    }

    loop {
        let radius = CustomType::<f64>::new("Search radius in metres:")
            .with_default(DEFAULT_RADIUS)
            .with_help_message("Press Enter for about one mile")
            .with_error_message("Please enter a valid number.")
            .with_validator(|x: &f64| {
                Ok::<_, CustomUserError>(if x.is_finite() && *x > 0.0 {
                    Validation::Valid
                } else {
                    Validation::Invalid("The radius must be a positive number.".into())
                })
            })
            .prompt()?;

        match pipeline::search(
            &services.overpass,
            location.coordinate,
            radius,
            services.threshold,
        ) {
            Ok(entries) => {
                println!();
                report::print(&entries, false)?;
            }
            Err(e) => {
                error!("{e}");
                println!("\nThe search failed, so there are no results to show.");
            }
        }

        let again = Confirm::new("Do you want to search with another radius?")
            .with_default(true)
            .prompt()?;
        if !again {
            break;
        }
    }

    println!("\nThanks for visiting EcoPOI!\n\nPlease try to leave the Earth better than you found it!\n");
    Ok(())
}

fn choose_location(services: &Services) -> Result<Location> {
    let source = Select::new(
        "How would you like to input your location?",
        vec![Source::Ip, Source::Manual],
    )
    .prompt()?;

    match source {
        Source::Ip => {
            let progress = spinner("Detecting location...");
            let location = locate::by_ip(&services.agent, &services.nominatim);
            progress.finish_and_clear();
            location
        }
        Source::Manual => {
            println!("{ADDRESS_EXAMPLES}");
            for _ in 0..ADDRESS_ATTEMPTS {
                let address = Text::new("Please enter your address:").prompt()?;
                let progress = spinner("Looking up address...");
                let found = services.nominatim.search(&address);
                progress.finish_and_clear();

                match found? {
                    Some(x) => return Ok(x),
                    None => println!("Unable to find the entered address. Please try again."),
                }
            }
            bail!("no address found after {ADDRESS_ATTEMPTS} attempts")
        }
    }
}

fn describe(generator: &impl TextGenerator, location: &Location) -> Result<()> {
    let mut texts = Vec::new();
    let progress = spinner("Writing about your location...");
    for topic in Topic::all() {
        match generator.generate(&topic.prompt(&location.address)) {
            Ok(x) => texts.push((topic, x)),
            Err(e) => warn!(topic = topic.title(), "text generation failed: {e:#}"),
        }
    }
    progress.finish_and_clear();

    for (topic, text) in texts {
        let show = Confirm::new(&format!("Do you want to print the {}?", topic.title()))
            .with_default(true)
            .prompt()?;
        if show {
            println!("\n{}:\n{text}\n", topic.title());
        }
    }
    Ok(())
}
