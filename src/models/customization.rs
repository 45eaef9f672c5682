//! 定制方案：工序（钻孔、装配、称重、打码）+ 左右部件选择

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    Drilling,
    Assembly,
    Weighing,
    Coding,
}

impl ProcessKind {
    pub const ALL: [ProcessKind; 4] = [
        ProcessKind::Drilling,
        ProcessKind::Assembly,
        ProcessKind::Weighing,
        ProcessKind::Coding,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProcessKind::Drilling => "钻孔",
            ProcessKind::Assembly => "装配",
            ProcessKind::Weighing => "称重",
            ProcessKind::Coding => "打码",
        }
    }
}

impl std::str::FromStr for ProcessKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drilling" => Ok(ProcessKind::Drilling),
            "assembly" => Ok(ProcessKind::Assembly),
            "weighing" => Ok(ProcessKind::Weighing),
            "coding" => Ok(ProcessKind::Coding),
            other => Err(format!("未知工序：{other}")),
        }
    }
}

impl std::fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomizationError {
    #[error("请至少启用一个工序")]
    NoProcessEnabled,

    #[error("工序优先级重复：{first}与{second}均为 {priority}")]
    DuplicatePriority {
        first: ProcessKind,
        second: ProcessKind,
        priority: u8,
    },

    #[error("优先级必须在 1 到 4 之间：{0}")]
    PriorityOutOfRange(u8),

    #[error("打码工序需要先启用装配工序")]
    CodingRequiresAssembly,

    #[error("请选择左右部件")]
    MissingParts,
}

/// 计时类工序参数（时间、次数）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimedParams {
    pub time_secs: Option<u32>,
    pub count: Option<u32>,
}

/// 称重工序参数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeightParams {
    pub grams: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSlot<P> {
    #[serde(default)]
    pub enabled: bool,
    pub priority: u8,
    #[serde(default)]
    pub params: P,
}

impl<P: Default> ProcessSlot<P> {
    fn with_priority(priority: u8) -> Self {
        Self {
            enabled: false,
            priority,
            params: P::default(),
        }
    }
}

/// Parameters of one enabled step, tagged by what the process needs.
#[derive(Debug, Clone, PartialEq)]
pub enum StepParams<'a> {
    Timed(&'a TimedParams),
    Weight(&'a WeightParams),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanStep<'a> {
    pub kind: ProcessKind,
    pub priority: u8,
    pub params: StepParams<'a>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CustomizationPlan {
    #[schema(value_type = Object)]
    pub drilling: ProcessSlot<TimedParams>,
    #[schema(value_type = Object)]
    pub assembly: ProcessSlot<TimedParams>,
    #[schema(value_type = Object)]
    pub weighing: ProcessSlot<WeightParams>,
    #[schema(value_type = Object)]
    pub coding: ProcessSlot<TimedParams>,
    #[serde(default)]
    pub left_part: Option<String>,
    #[serde(default)]
    pub right_part: Option<String>,
}

impl Default for CustomizationPlan {
    fn default() -> Self {
        Self {
            drilling: ProcessSlot::with_priority(1),
            assembly: ProcessSlot::with_priority(2),
            weighing: ProcessSlot::with_priority(3),
            coding: ProcessSlot::with_priority(4),
            left_part: None,
            right_part: None,
        }
    }
}

impl CustomizationPlan {
    pub fn is_enabled(&self, kind: ProcessKind) -> bool {
        match kind {
            ProcessKind::Drilling => self.drilling.enabled,
            ProcessKind::Assembly => self.assembly.enabled,
            ProcessKind::Weighing => self.weighing.enabled,
            ProcessKind::Coding => self.coding.enabled,
        }
    }

    pub fn priority(&self, kind: ProcessKind) -> u8 {
        match kind {
            ProcessKind::Drilling => self.drilling.priority,
            ProcessKind::Assembly => self.assembly.priority,
            ProcessKind::Weighing => self.weighing.priority,
            ProcessKind::Coding => self.coding.priority,
        }
    }

    /// Enabling coding needs assembly; disabling assembly also disables coding.
    pub fn set_enabled(&mut self, kind: ProcessKind, enabled: bool) -> Result<(), CustomizationError> {
        match kind {
            ProcessKind::Drilling => self.drilling.enabled = enabled,
            ProcessKind::Assembly => {
                self.assembly.enabled = enabled;
                if !enabled {
                    self.coding.enabled = false;
                }
            }
            ProcessKind::Weighing => self.weighing.enabled = enabled,
            ProcessKind::Coding => {
                if enabled && !self.assembly.enabled {
                    return Err(CustomizationError::CodingRequiresAssembly);
                }
                self.coding.enabled = enabled;
            }
        }
        Ok(())
    }

    pub fn set_priority(&mut self, kind: ProcessKind, priority: u8) -> Result<(), CustomizationError> {
        if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
            return Err(CustomizationError::PriorityOutOfRange(priority));
        }
        match kind {
            ProcessKind::Drilling => self.drilling.priority = priority,
            ProcessKind::Assembly => self.assembly.priority = priority,
            ProcessKind::Weighing => self.weighing.priority = priority,
            ProcessKind::Coding => self.coding.priority = priority,
        }
        Ok(())
    }

    /// Applies the assembly/coding dependency to a plan received as a whole.
    pub fn normalize(&mut self) {
        if !self.assembly.enabled {
            self.coding.enabled = false;
        }
    }

    /// Enabled steps ordered by priority.
    pub fn enabled_steps(&self) -> Vec<PlanStep<'_>> {
        let mut steps: Vec<PlanStep<'_>> = ProcessKind::ALL
            .iter()
            .filter(|kind| self.is_enabled(**kind))
            .map(|kind| PlanStep {
                kind: *kind,
                priority: self.priority(*kind),
                params: match kind {
                    ProcessKind::Drilling => StepParams::Timed(&self.drilling.params),
                    ProcessKind::Assembly => StepParams::Timed(&self.assembly.params),
                    ProcessKind::Weighing => StepParams::Weight(&self.weighing.params),
                    ProcessKind::Coding => StepParams::Timed(&self.coding.params),
                },
            })
            .collect();
        steps.sort_by_key(|step| step.priority);
        steps
    }

    pub fn validate(&self) -> Result<(), CustomizationError> {
        if self.coding.enabled && !self.assembly.enabled {
            return Err(CustomizationError::CodingRequiresAssembly);
        }

        let steps = self.enabled_steps();
        if steps.is_empty() {
            return Err(CustomizationError::NoProcessEnabled);
        }
        for step in &steps {
            if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&step.priority) {
                return Err(CustomizationError::PriorityOutOfRange(step.priority));
            }
        }
        // steps 已按优先级排序，重复值必然相邻
        for pair in steps.windows(2) {
            if pair[0].priority == pair[1].priority {
                return Err(CustomizationError::DuplicatePriority {
                    first: pair[0].kind,
                    second: pair[1].kind,
                    priority: pair[0].priority,
                });
            }
        }

        let has_part = |part: &Option<String>| part.as_deref().is_some_and(|p| !p.trim().is_empty());
        if !has_part(&self.left_part) || !has_part(&self.right_part) {
            return Err(CustomizationError::MissingParts);
        }
        Ok(())
    }

    /// Work plan text for the plan. Call after `validate`.
    pub fn describe(&self) -> String {
        let steps = self.enabled_steps();
        let mut lines = vec![
            steps
                .iter()
                .map(|step| step.kind.label())
                .collect::<Vec<_>>()
                .join(" - "),
        ];

        for step in &steps {
            let name = step.kind.label();
            match step.params {
                StepParams::Weight(params) => {
                    if let Some(grams) = params.grams {
                        lines.push(format!("{name}重量：{grams}g"));
                    }
                }
                StepParams::Timed(params) => {
                    if let Some(secs) = params.time_secs {
                        lines.push(format!("{name}时间：{secs}S"));
                    }
                    if let Some(count) = params.count {
                        lines.push(format!("{name}次数：{count}次"));
                    }
                }
            }
        }

        let parts: Vec<&str> = [self.left_part.as_deref(), self.right_part.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !parts.is_empty() {
            lines.push(parts.join(" + "));
        }
        lines.join("\n")
    }

    pub fn confirm(&self) -> Result<String, CustomizationError> {
        self.validate()?;
        Ok(self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_with_parts() -> CustomizationPlan {
        CustomizationPlan {
            left_part: Some("左壳".to_string()),
            right_part: Some("右壳".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_duplicate_priority_blocks_confirm() {
        let mut plan = plan_with_parts();
        plan.set_enabled(ProcessKind::Drilling, true).unwrap();
        plan.set_enabled(ProcessKind::Weighing, true).unwrap();
        plan.set_priority(ProcessKind::Weighing, 1).unwrap();

        let err = plan.confirm().unwrap_err();
        assert!(matches!(err, CustomizationError::DuplicatePriority { priority: 1, .. }));
    }

    #[test]
    fn test_disabled_processes_may_share_priority() {
        let mut plan = plan_with_parts();
        plan.set_enabled(ProcessKind::Drilling, true).unwrap();
        plan.set_priority(ProcessKind::Weighing, 1).unwrap();
        assert!(plan.confirm().is_ok());
    }

    #[test]
    fn test_disabling_assembly_disables_coding() {
        let mut plan = plan_with_parts();
        plan.set_enabled(ProcessKind::Assembly, true).unwrap();
        plan.set_enabled(ProcessKind::Coding, true).unwrap();
        plan.set_enabled(ProcessKind::Assembly, false).unwrap();
        assert!(!plan.is_enabled(ProcessKind::Coding));
    }

    #[test]
    fn test_coding_requires_assembly() {
        let mut plan = plan_with_parts();
        assert_eq!(
            plan.set_enabled(ProcessKind::Coding, true),
            Err(CustomizationError::CodingRequiresAssembly)
        );
        assert!(!plan.is_enabled(ProcessKind::Coding));
    }

    #[test]
    fn test_normalize_applies_coding_rule() {
        let mut plan = plan_with_parts();
        plan.coding.enabled = true;
        assert_eq!(plan.validate(), Err(CustomizationError::CodingRequiresAssembly));
        plan.normalize();
        assert!(!plan.coding.enabled);
    }

    #[test]
    fn test_confirm_requires_process_and_parts() {
        let plan = plan_with_parts();
        assert_eq!(plan.confirm(), Err(CustomizationError::NoProcessEnabled));

        let mut plan = CustomizationPlan::default();
        plan.set_enabled(ProcessKind::Drilling, true).unwrap();
        plan.left_part = Some("左壳".to_string());
        assert_eq!(plan.confirm(), Err(CustomizationError::MissingParts));
    }

    #[test]
    fn test_priority_range() {
        let mut plan = CustomizationPlan::default();
        assert_eq!(
            plan.set_priority(ProcessKind::Drilling, 5),
            Err(CustomizationError::PriorityOutOfRange(5))
        );
        assert_eq!(
            plan.set_priority(ProcessKind::Drilling, 0),
            Err(CustomizationError::PriorityOutOfRange(0))
        );
    }

    #[test]
    fn test_describe_orders_by_priority() {
        let mut plan = plan_with_parts();
        plan.set_enabled(ProcessKind::Drilling, true).unwrap();
        plan.set_enabled(ProcessKind::Assembly, true).unwrap();
        plan.set_enabled(ProcessKind::Weighing, true).unwrap();
        plan.set_enabled(ProcessKind::Coding, true).unwrap();
        plan.set_priority(ProcessKind::Drilling, 3).unwrap();
        plan.set_priority(ProcessKind::Weighing, 1).unwrap();
        plan.drilling.params = TimedParams {
            time_secs: Some(5),
            count: Some(3),
        };
        plan.assembly.params = TimedParams {
            time_secs: Some(25),
            count: None,
        };
        plan.weighing.params = WeightParams { grams: Some(12.5) };

        let text = plan.confirm().unwrap();
        assert_eq!(
            text,
            "称重 - 装配 - 钻孔 - 打码\n\
             称重重量：12.5g\n\
             装配时间：25S\n\
             钻孔时间：5S\n\
             钻孔次数：3次\n\
             左壳 + 右壳"
        );
    }

    #[test]
    fn test_plan_json_shape() {
        let plan: CustomizationPlan = serde_json::from_value(serde_json::json!({
            "drilling": { "enabled": true, "priority": 1, "params": { "time_secs": 5 } },
            "assembly": { "priority": 2 },
            "weighing": { "enabled": true, "priority": 2, "params": { "grams": 30 } },
            "coding": { "priority": 4 },
            "left_part": "A",
            "right_part": "B"
        }))
        .unwrap();
        assert_eq!(plan.drilling.params.time_secs, Some(5));
        assert_eq!(plan.weighing.params.grams, Some(30.0));
        assert_eq!(plan.confirm().unwrap(), "钻孔 - 称重\n钻孔时间：5S\n称重重量：30g\nA + B");
    }
}
