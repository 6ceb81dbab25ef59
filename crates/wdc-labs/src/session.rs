use serde::Serialize;

use crate::sponsorship::DEFAULT_PLAN;

/// Which dialog the landing page is showing, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenDialog {
    #[default]
    None,
    Waitlist,
    Sponsor,
    Success,
}

/// Per-visit UI state owned by the hosting view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LandingSession {
    dialog: OpenDialog,
    selected_plan: Option<String>,
}

impl LandingSession {
    pub fn dialog(&self) -> OpenDialog {
        self.dialog
    }

    /// Opening without a plan keeps whatever was picked before.
    pub fn open_waitlist(&mut self, plan: Option<&str>) {
        if let Some(plan) = plan {
            self.select_plan(plan);
        }
        self.dialog = OpenDialog::Waitlist;
    }

    pub fn open_sponsor(&mut self, plan: Option<&str>) {
        if let Some(plan) = plan {
            self.select_plan(plan);
        }
        self.dialog = OpenDialog::Sponsor;
    }

    pub fn waitlist_succeeded(&mut self) {
        self.dialog = OpenDialog::Success;
    }

    pub fn close(&mut self) {
        self.dialog = OpenDialog::None;
    }

    pub fn selected_plan(&self) -> Option<&str> {
        self.selected_plan.as_deref()
    }

    pub fn plan_name(&self) -> &str {
        self.selected_plan().unwrap_or(DEFAULT_PLAN)
    }

    fn select_plan(&mut self, plan: &str) {
        let plan = plan.trim();
        if !plan.is_empty() {
            self.selected_plan = Some(plan.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waitlist_without_plan_keeps_previous_selection() {
        let mut session = LandingSession::default();
        session.open_sponsor(Some("Pro"));
        session.close();
        session.open_waitlist(None);

        assert_eq!(session.dialog(), OpenDialog::Waitlist);
        assert_eq!(session.plan_name(), "Pro");
    }

    #[test]
    fn plan_defaults_until_one_is_chosen() {
        let mut session = LandingSession::default();
        assert_eq!(session.plan_name(), DEFAULT_PLAN);
        session.open_waitlist(Some(""));
        assert!(session.selected_plan().is_none());
    }

    #[test]
    fn success_replaces_waitlist_dialog() {
        let mut session = LandingSession::default();
        session.open_waitlist(Some("Starter"));
        session.waitlist_succeeded();
        assert_eq!(session.dialog(), OpenDialog::Success);
        session.close();
        assert_eq!(session.dialog(), OpenDialog::None);
    }
}
