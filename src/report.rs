use std::fmt::Write;

use anyhow::Result;
use itertools::Itertools;

use crate::pipeline::Entry;

pub fn render(entries: &[Entry]) -> Result<String> {
    let mut output = String::new();
    if entries.is_empty() {
        writeln!(
            output,
            "No points of interest found within the specified radius. \
            You might want to expand the radius to find more results."
        )?;
        return Ok(output);
    }

    writeln!(output, "Points of Interest:")?;
    for x in entries {
        writeln!(output)?;
        writeln!(
            output,
            "- {} ({})",
            x.name,
            x.category.unwrap_or("uncategorised")
        )?;
        let tags = x.tags.iter().map(|(k, v)| format!("{k}={v}")).join(", ");
        writeln!(output, "Tags: {tags}")?;
        writeln!(output, "Map: {}", x.id.link())?;
    }
    Ok(output)
}

pub fn print(entries: &[Entry], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
    } else {
        print!("{}", render(entries)?);
    }
    Ok(())
}
