//! Operator action catalog.

use opsdash_core::Resource;

/// A state-changing backend operation the operator can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    StartBot,
    StopBot,
    ManualBuy,
    ManualSell,
    ExcludeCoin,
    RestoreCoin,
    SaveSettings,
    ApplyStrategy,
    RunAnalysis,
}

impl Action {
    /// Stable code, used as the action's disconnect channel key.
    pub fn code(&self) -> &'static str {
        match self {
            Action::StartBot => "start-bot",
            Action::StopBot => "stop-bot",
            Action::ManualBuy => "manual-buy",
            Action::ManualSell => "manual-sell",
            Action::ExcludeCoin => "exclude-coin",
            Action::RestoreCoin => "restore-coin",
            Action::SaveSettings => "save-settings",
            Action::ApplyStrategy => "apply-strategy",
            Action::RunAnalysis => "run-analysis",
        }
    }

    /// Backend endpoint path.
    pub fn path(&self) -> String {
        format!("/api/{}", self.code())
    }

    /// Resources to re-read after this action succeeds. The fixed mapping
    /// keeps follow-up refreshes deterministic: the same action always
    /// triggers the same set, in the same order.
    pub fn follow_ups(&self) -> &'static [Resource] {
        match self {
            Action::StartBot
            | Action::StopBot
            | Action::SaveSettings
            | Action::ApplyStrategy => &[Resource::Status],
            Action::ManualBuy => &[Resource::Signals, Resource::Positions],
            Action::ManualSell | Action::ExcludeCoin | Action::RestoreCoin => {
                &[Resource::Positions]
            }
            Action::RunAnalysis => &[Resource::Signals],
        }
    }

    /// Restoring a coin also drops its excluded-list row locally, instead
    /// of waiting a full excluded-list poll cycle.
    pub fn removes_excluded_row(&self) -> bool {
        matches!(self, Action::RestoreCoin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_from_code() {
        assert_eq!(Action::StartBot.path(), "/api/start-bot");
        assert_eq!(Action::ManualSell.path(), "/api/manual-sell");
    }

    #[test]
    fn test_follow_ups_are_deterministic() {
        assert_eq!(Action::StopBot.follow_ups(), &[Resource::Status]);
        assert_eq!(
            Action::ManualBuy.follow_ups(),
            &[Resource::Signals, Resource::Positions]
        );
        assert_eq!(Action::RunAnalysis.follow_ups(), &[Resource::Signals]);
    }

    #[test]
    fn test_only_restore_removes_excluded_row() {
        assert!(Action::RestoreCoin.removes_excluded_row());
        assert!(!Action::ExcludeCoin.removes_excluded_row());
    }
}
