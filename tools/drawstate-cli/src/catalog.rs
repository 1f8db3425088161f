//! Catalog command - list every tracked field

use anyhow::Result;
use clap::Args;
use nether_drawstate::catalog::{Arity, FieldInfo, Relaxation};
use nether_drawstate::{PipelineSubset, StateGroup};

/// Arguments for the catalog command
#[derive(Args)]
pub struct CatalogArgs {
    /// Only list fields of this group (e.g. EXTENDED_DYNAMIC_STATE_3)
    #[arg(long)]
    pub group: Option<String>,

    /// Only list fields gating this pipeline subset
    #[arg(long, value_parser = parse_subset)]
    pub subset: Option<PipelineSubset>,
}

fn parse_subset(value: &str) -> Result<PipelineSubset, String> {
    PipelineSubset::ALL
        .into_iter()
        .find(|subset| subset.name() == value)
        .ok_or_else(|| format!("unknown subset '{}'", value))
}

/// Execute the catalog command
pub fn execute(args: CatalogArgs) -> Result<()> {
    let groups: Vec<StateGroup> = match &args.group {
        Some(name) => {
            let group = StateGroup::ALL
                .into_iter()
                .find(|group| group.name().eq_ignore_ascii_case(name))
                .ok_or_else(|| anyhow::anyhow!("Unknown state group: {}", name))?;
            vec![group]
        }
        None => StateGroup::ALL.to_vec(),
    };

    for group in groups {
        let (scalars, arrays) = field_counts(group);
        println!(
            "=== {} (ordinal {}, {} scalars, {} arrays) ===",
            group,
            group.ordinal(),
            scalars,
            arrays
        );
        for field in group.fields() {
            let info = field.info();
            if args.subset.is_some() && info.subset != args.subset {
                continue;
            }
            println!("  {}", describe(info));
        }
    }

    if let Some(subset) = args.subset {
        let stages: Vec<_> = subset.shader_stages().iter().map(|s| s.name()).collect();
        println!();
        println!("{} shader stages: {}", subset.name(), stages.join(", "));
    }

    Ok(())
}

/// Scalar and array field counts of `group`
fn field_counts(group: StateGroup) -> (usize, usize) {
    let arrays = group.fields().filter(|field| field.arity().is_array()).count();
    (group.fields().count() - arrays, arrays)
}

fn describe(info: &FieldInfo) -> String {
    let arity = match info.arity {
        Arity::Scalar => "scalar".to_string(),
        Arity::CompileTimeArray(len) => format!("[{}]", len),
        Arity::InitTimeArray(limit) => format!("[{}]", limit.name()),
    };
    let mut line = format!("{:<40} {}", info.name, arity);
    if let Some(subset) = info.subset {
        line.push_str(&format!("  subset={}", subset.name()));
    }
    if info.relaxation != Relaxation::Strict {
        line.push_str("  (relaxed with unused attachments)");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use nether_drawstate::FieldId;

    #[test]
    fn test_parse_subset() {
        assert_eq!(
            parse_subset("fragment_shader"),
            Ok(PipelineSubset::FragmentShader)
        );
        assert!(parse_subset("vertex").is_err());
    }

    #[test]
    fn test_field_counts() {
        // MISC holds three scalars plus shader slots and two attachment arrays
        assert_eq!(field_counts(StateGroup::Misc), (3, 3));
        assert_eq!(field_counts(StateGroup::ExtendedDynamicState2), (5, 0));
    }

    #[test]
    fn test_describe_marks_subset_and_relaxation() {
        let line = describe(FieldId::CullMode.info());
        assert!(line.contains("subset=pre_rasterization_shaders"));

        let line = describe(FieldId::ColorAttachmentFormats.info());
        assert!(line.contains("[max_color_attachments]"));
        assert!(line.contains("relaxed"));
    }
}
