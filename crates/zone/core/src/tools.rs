//! Tool allow-list checks.

use crate::ids::ToolId;
use crate::zone::Zone;

/// An empty allow-list admits anything, including no tool at all. Otherwise
/// the tool id must match an entry exactly.
pub fn is_tool_allowed(tool: Option<&ToolId>, zone: &Zone) -> bool {
    if zone.allowed_tools.is_empty() {
        return true;
    }

    tool.is_some_and(|tool| zone.allowed_tools.contains(tool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ZoneDefinition;

    fn zone(allowed: &[&str]) -> Zone {
        Zone::from_definition(ZoneDefinition {
            id: "z".to_owned(),
            allowed_tools: allowed.iter().map(|t| (*t).to_owned()).collect(),
            ..ZoneDefinition::default()
        })
        .unwrap()
    }

    #[test]
    fn empty_list_allows_everything() {
        let zone = zone(&[]);
        assert!(is_tool_allowed(Some(&ToolId::from("any")), &zone));
        assert!(is_tool_allowed(None, &zone));
    }

    #[test]
    fn restricted_list_requires_exact_match() {
        let zone = zone(&["omni_pickaxe", "omni_hoe"]);
        assert!(is_tool_allowed(Some(&ToolId::from("omni_hoe")), &zone));
        assert!(!is_tool_allowed(Some(&ToolId::from("OMNI_HOE")), &zone));
        assert!(!is_tool_allowed(Some(&ToolId::from("stick")), &zone));
        assert!(!is_tool_allowed(None, &zone));
    }
}
