use serde::Serialize;
use utoipa::ToSchema;

/// Work instruction card shown next to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct InstructionTemplate {
    pub station: String,
    pub task_title: String,
    pub objective: String,
    pub prereqs: Option<String>,
    pub inputs: Option<String>,
    pub steps: Vec<String>,
    pub quality_gates: Vec<String>,
    pub log_on_completion: Vec<String>,
}

struct Template {
    station: &'static str,
    task_title: &'static str,
    objective: &'static str,
    prereqs: Option<&'static str>,
    inputs: Option<&'static str>,
    steps: &'static [&'static str],
    quality_gates: &'static [&'static str],
    log_on_completion: &'static [&'static str],
}

const TEMPLATES: [Template; 7] = [
    Template {
        station: "Teardown",
        task_title: "Donor Intake & VIN / Condition Baseline",
        objective: "Lock baseline data so the donor vehicle condition is documented for rebuild quality.",
        prereqs: Some("Donor check-in complete, workspace prepared"),
        inputs: Some("VIN scanner / camera / tag printer / basic diagnostic tools"),
        steps: &[
            "Verify VIN and capture photos (dash/door/engine bay)",
            "Photograph engine/transmission numbers and ECU labels",
            "Capture odometer and instrument cluster condition",
            "Capture 360° underbody corrosion/impact evidence",
            "Check initial “Reuse / Rebuild / Scrap” classification",
            "Create digital donor buildbook + print QR labels",
        ],
        quality_gates: &["10+ VIN/serial evidence photos", "Baseline report created"],
        log_on_completion: &["Photos", "Notes (anomalies)"],
    },
    Template {
        station: "Teardown",
        task_title: "Donor Parts Cataloging (nuts & bolts level)",
        objective: "Catalog every disassembled part as trackable SKU/sub-SKU entries.",
        prereqs: None,
        inputs: Some("Part trays / labels / scale (fasteners) / calipers / wash boxes"),
        steps: &[
            "Disassemble by sub-assembly (e.g., front suspension)",
            "Label each tray with “donor build code + sub-assembly + date”",
            "Bag fasteners and record counts per bag",
            "Record dimensions/wear for reuse candidates",
            "Tag rebuild candidates with “Rebuild required”",
            "Record scrap reason for discarded parts",
        ],
        quality_gates: &["Zero missing tray/bag labels", "Fastener counts recorded"],
        log_on_completion: &[
            "Parts count",
            "Measurements (optional)",
            "Reuse/Rebuild/Scrap decision",
        ],
    },
    Template {
        station: "Powertrain",
        task_title: "Engine Rebuild Coordination (Vendor + internal workflow)",
        objective: "Lock lead time, parts, and decisions so engine rebuild is not the build bottleneck.",
        prereqs: Some("Donor engine teardown complete, rebuild scope agreed"),
        inputs: Some("bearing kit / seals / machining vendor info / torque spec sheet"),
        steps: &[
            "Confirm rebuild scope (stock / performance / displacement)",
            "Confirm required kit list (bearing/seal/gasket)",
            "Reserve machining vendor slot and confirm due date",
            "Record crank/case measurements (critical fields only)",
            "If missing parts, Block with reason “Awaiting parts/material”",
            "Update ETA (Expected back on date)",
        ],
        quality_gates: &["Vendor + ETA confirmed", "Required parts list confirmed"],
        log_on_completion: &["Vendor name", "ETA", "Missing parts list"],
    },
    Template {
        station: "Carbon",
        task_title: "Carbon Panel Fitment Loop",
        objective: "Iterate panel gaps and alignment to meet final assembly quality.",
        prereqs: Some("Chassis prep complete, panels ready"),
        inputs: Some("panel set / alignment shims / clamps / measuring tape / gap gauge"),
        steps: &[
            "Pre-fit panels (temporary mounting)",
            "Measure left/right gaps (verify target range)",
            "Mark interference points and adjust",
            "Re-measure after adjustment",
            "Apply temporary torque to mounting points",
            "Call QC for interim approval",
        ],
        quality_gates: &[
            "Gap tolerance within spec",
            "No visible warp or stress points",
        ],
        log_on_completion: &["gap measurements", "QC pass/fail"],
    },
    Template {
        station: "Paint",
        task_title: "Paint Prep — Mexico Blue",
        objective: "Complete surface, environment, and material readiness for paint quality.",
        prereqs: Some("Bodywork complete, booth available"),
        inputs: Some("primer / paint / booth filters / PPE / mixing sheet"),
        steps: &[
            "Inspect surface defects (hand/lighting)",
            "Verify masking lines",
            "Check booth environment (temperature/humidity)",
            "Record paint mix batch",
            "Verify test spray",
            "Proceed with full paint",
            "Record cure start time",
        ],
        quality_gates: &["Mix batch recorded", "Booth environment OK"],
        log_on_completion: &["Batch ID", "Booth conditions", "Cure start time"],
    },
    Template {
        station: "Electrical",
        task_title: "Harness Routing & ECU Check",
        objective: "Complete harness routing, connector checks, and ECU baseline.",
        prereqs: Some("Interior access cleared, harness kit ready"),
        inputs: Some("harness / ECU / multimeter / connector checklist"),
        steps: &[
            "Verify harness routing path",
            "Secure clips and mounting points",
            "Check connectors against required list",
            "Verify power/ground continuity",
            "Confirm ECU initial communication",
        ],
        quality_gates: &["Connector checklist 100%", "ECU handshake OK"],
        log_on_completion: &["Connector exceptions", "ECU status"],
    },
    Template {
        station: "QC",
        task_title: "Final QC Gate (pre-delivery)",
        objective: "Pass GW standards prior to delivery.",
        prereqs: None,
        inputs: None,
        steps: &[
            "Panel gaps final check",
            "Paint finish check",
            "Torque witness mark check",
            "Fluids & leak inspection",
            "Test drive checklist",
            "Sign-off",
        ],
        quality_gates: &[],
        log_on_completion: &["QC sign-off name", "Exceptions"],
    },
];

const GENERIC_STEPS: [&str; 6] = [
    "Review work instructions",
    "Prepare required parts/tools",
    "Execute task",
    "Perform mid-check",
    "Finalize cleanup",
    "Log completion",
];

fn to_owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl From<&Template> for InstructionTemplate {
    fn from(t: &Template) -> Self {
        Self {
            station: t.station.to_string(),
            task_title: t.task_title.to_string(),
            objective: t.objective.to_string(),
            prereqs: t.prereqs.map(str::to_string),
            inputs: t.inputs.map(str::to_string),
            steps: to_owned(t.steps),
            quality_gates: to_owned(t.quality_gates),
            log_on_completion: to_owned(t.log_on_completion),
        }
    }
}

/// Looks up the instruction card for a task.
///
/// An exact (case-insensitive) title match or a station equal to the phase
/// selects a template; the first hit wins. Anything else gets the generic card.
pub fn instruction_template(task_title: Option<&str>, phase: Option<&str>) -> InstructionTemplate {
    let title = task_title.unwrap_or_default().to_lowercase();
    let phase_value = phase.unwrap_or_default().to_lowercase();

    TEMPLATES
        .iter()
        .find(|t| t.task_title.to_lowercase() == title || t.station.to_lowercase() == phase_value)
        .map(InstructionTemplate::from)
        .unwrap_or_else(|| InstructionTemplate {
            station: phase.unwrap_or("General").to_string(),
            task_title: task_title.unwrap_or("Work Instruction").to_string(),
            objective: "Confirm the objective and execute to safety and quality standards."
                .to_string(),
            prereqs: None,
            inputs: None,
            steps: to_owned(&GENERIC_STEPS),
            quality_gates: vec!["Required checks completed".to_string()],
            log_on_completion: vec!["Photos/notes".to_string()],
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_match_is_case_insensitive() {
        let card = instruction_template(Some("harness routing & ecu check"), Some("Wiring"));
        assert_eq!(card.station, "Electrical");
        assert_eq!(card.steps.len(), 5);
        assert_eq!(card.quality_gates, vec!["Connector checklist 100%", "ECU handshake OK"]);
    }

    #[test]
    fn phase_selects_first_station_template() {
        let card = instruction_template(Some("Strip interior"), Some("teardown"));
        assert_eq!(card.task_title, "Donor Intake & VIN / Condition Baseline");
    }

    #[test]
    fn qc_template_has_no_quality_gates() {
        let card = instruction_template(None, Some("QC"));
        assert_eq!(card.objective, "Pass GW standards prior to delivery.");
        assert!(card.quality_gates.is_empty());
        assert!(card.prereqs.is_none());
    }

    #[test]
    fn unknown_task_gets_generic_card() {
        let card = instruction_template(Some("Weld roll cage"), Some("Fabrication"));
        assert_eq!(card.station, "Fabrication");
        assert_eq!(card.task_title, "Weld roll cage");
        assert_eq!(card.steps.first().map(String::as_str), Some("Review work instructions"));
        assert_eq!(card.log_on_completion, vec!["Photos/notes"]);

        let card = instruction_template(None, None);
        assert_eq!(card.station, "General");
        assert_eq!(card.task_title, "Work Instruction");
    }
}
