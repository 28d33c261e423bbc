//! Variants command

use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};
use xenia_manager_versions::Variant;

#[derive(Tabled)]
struct VariantRow {
    #[tabled(rename = "Variant")]
    name: String,
    #[tabled(rename = "Aliases")]
    aliases: String,
    #[tabled(rename = "Feed")]
    feed: String,
    #[tabled(rename = "Packaging")]
    packaging: String,
    #[tabled(rename = "Directory")]
    family: String,
}

pub fn run() -> Result<()> {
    let rows: Vec<VariantRow> = Variant::ALL
        .into_iter()
        .map(|v| {
            let spec = v.spec();
            VariantRow {
                name: spec.label.to_string(),
                aliases: spec.aliases.join(", "),
                feed: format!("{}/{}", spec.owner, spec.repo),
                packaging: spec.packaging.to_string(),
                family: format!("versions/{}", spec.family),
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{}", table);
    Ok(())
}
