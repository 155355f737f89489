// file: src/geom/part.rs
// version: 1.0.0
// guid: 0d93e6f1-7c2b-4a85-9e40-5b1c8f27a6d3

//! Deferred-commit editing of GEOM PART tables
//!
//! Every change is issued with `flags=x`, which makes the kernel stage it
//! without writing the table. A provider with staged changes stays pending
//! until it is committed or undone. Dropping the session undoes whatever is
//! still pending, so an aborted run leaves the disks untouched.

use tracing::{debug, info, warn};

use super::control::Control;
use super::request::{Param, Request};
use crate::Result;

/// GEOM class handled by this module
pub const PART_CLASS: &str = "PART";

/// Editing session over a control backend
pub struct PartSession<'c, C: Control + ?Sized> {
    control: &'c mut C,
    uncommitted: Vec<String>,
}

impl<'c, C: Control + ?Sized> PartSession<'c, C> {
    pub fn new(control: &'c mut C) -> Self {
        Self {
            control,
            uncommitted: Vec::new(),
        }
    }

    /// Providers with staged, uncommitted changes
    pub fn uncommitted(&self) -> &[String] {
        &self.uncommitted
    }

    pub fn is_pending(&self, provider: &str) -> bool {
        self.uncommitted.iter().any(|p| p == provider)
    }

    /// Stage `verb` on `provider` with extra parameters
    pub fn run(&mut self, provider: &str, verb: &str, params: Vec<Param>) -> Result<Option<String>> {
        let mut request = Request::new();
        request
            .ro_param("class", PART_CLASS)
            .ro_param("verb", verb)
            .ro_param("arg0", provider)
            .ro_param("flags", "x");
        for param in params {
            request.push(param);
        }

        let error = self.control.issue(&request)?;
        match &error {
            None => {
                debug!("Staged {} on {}", verb, provider);
                if !self.is_pending(provider) {
                    self.uncommitted.push(provider.to_string());
                }
            }
            Some(e) => warn!("{} on {} failed: {}", verb, provider, e),
        }
        Ok(error)
    }

    /// Write staged changes of `provider` to disk
    pub fn commit(&mut self, provider: &str) -> Result<Option<String>> {
        self.finish(provider, "commit")
    }

    /// Throw away staged changes of `provider`
    pub fn undo(&mut self, provider: &str) -> Result<Option<String>> {
        self.finish(provider, "undo")
    }

    /// Commit every pending provider, returning `provider: error` for failures
    pub fn commit_all(&mut self) -> Result<Vec<String>> {
        self.finish_all("commit")
    }

    /// Undo every pending provider, returning `provider: error` for failures
    pub fn undo_all(&mut self) -> Result<Vec<String>> {
        self.finish_all("undo")
    }

    fn finish(&mut self, provider: &str, verb: &str) -> Result<Option<String>> {
        if !self.is_pending(provider) {
            return Ok(None);
        }

        let mut request = Request::new();
        request
            .ro_param("class", PART_CLASS)
            .ro_param("verb", verb)
            .ro_param("arg0", provider);

        let error = self.control.issue(&request)?;
        if error.is_none() {
            info!("{} of {} done", verb, provider);
            self.uncommitted.retain(|p| p != provider);
        }
        Ok(error)
    }

    fn finish_all(&mut self, verb: &str) -> Result<Vec<String>> {
        let mut failures = Vec::new();
        for provider in self.uncommitted.clone() {
            if let Some(error) = self.finish(&provider, verb)? {
                failures.push(format!("{}: {}", provider, error));
            }
        }
        Ok(failures)
    }
}

impl<C: Control + ?Sized> Drop for PartSession<'_, C> {
    fn drop(&mut self) {
        if self.uncommitted.is_empty() {
            return;
        }
        warn!("Undoing uncommitted changes on {}", self.uncommitted.join(", "));
        match self.undo_all() {
            Ok(failures) => {
                for failure in failures {
                    warn!("undo failed: {}", failure);
                }
            }
            Err(e) => warn!("undo failed: {}", e),
        }
    }
}

/// Map a user-facing type name onto what gpart expects for `scheme`
pub fn partition_type_for(scheme: &str, ty: &str) -> String {
    let ty = ty.to_lowercase();
    match scheme.to_lowercase().as_str() {
        "gpt" => match ty.as_str() {
            "" | "freebsd" => "freebsd-ufs".to_string(),
            "swap" => "freebsd-swap".to_string(),
            _ => ty,
        },
        "mbr" if ty.is_empty() || ty == "swap" || ty.starts_with("freebsd-") => {
            "freebsd".to_string()
        }
        _ => ty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::control::DryRunControl;

    fn verbs(control: &DryRunControl) -> Vec<String> {
        control
            .issued()
            .iter()
            .filter_map(|r| r.get("verb").and_then(|v| v.as_str()).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_run_stages_with_deferred_flag() {
        let mut control = DryRunControl::new();
        {
            let mut session = PartSession::new(&mut control);
            let error = session
                .run("ada0", "delete", vec![Param::ro("index", 2 as libc::c_long)])
                .unwrap();
            assert!(error.is_none());
            assert_eq!(session.uncommitted(), ["ada0".to_string()]);
            assert!(session.commit("ada0").unwrap().is_none());
        }

        let staged = &control.issued()[0];
        assert_eq!(staged.get("class").and_then(|v| v.as_str()), Some("PART"));
        assert_eq!(staged.get("arg0").and_then(|v| v.as_str()), Some("ada0"));
        assert_eq!(staged.get("flags").and_then(|v| v.as_str()), Some("x"));
        assert_eq!(staged.get("index"), Some(&(2 as libc::c_long).into()));
        assert_eq!(verbs(&control), vec!["delete", "commit"]);
    }

    #[test]
    fn test_failed_run_is_not_pending() {
        let mut control = DryRunControl::with_error("Invalid index");
        let mut session = PartSession::new(&mut control);

        let error = session.run("ada0", "delete", Vec::new()).unwrap();

        assert_eq!(error.as_deref(), Some("Invalid index"));
        assert!(session.uncommitted().is_empty());
    }

    #[test]
    fn test_provider_recorded_once() {
        let mut control = DryRunControl::new();
        let mut session = PartSession::new(&mut control);
        session.run("ada0", "add", Vec::new()).unwrap();
        session.run("ada0", "add", Vec::new()).unwrap();
        assert_eq!(session.uncommitted().len(), 1);
        session.commit_all().unwrap();
    }

    #[test]
    fn test_commit_of_clean_provider_is_noop() {
        let mut control = DryRunControl::new();
        {
            let mut session = PartSession::new(&mut control);
            assert!(session.commit("ada9").unwrap().is_none());
            assert!(session.undo("ada9").unwrap().is_none());
        }
        assert!(control.issued().is_empty());
    }

    #[test]
    fn test_commit_all_keeps_failures_pending() {
        let mut control = DryRunControl::new();
        control
            .push_outcome(None)
            .push_outcome(None)
            .push_outcome(Some("Device busy"))
            .push_outcome(None);
        {
            let mut session = PartSession::new(&mut control);
            session.run("ada0", "add", Vec::new()).unwrap();
            session.run("ada1", "add", Vec::new()).unwrap();

            let failures = session.commit_all().unwrap();

            assert_eq!(failures, vec!["ada0: Device busy".to_string()]);
            assert_eq!(session.uncommitted(), ["ada0".to_string()]);
        }
        // Drop undid the remaining provider
        assert_eq!(verbs(&control), vec!["add", "add", "commit", "commit", "undo"]);
    }

    #[test]
    fn test_drop_undoes_pending_changes() {
        let mut control = DryRunControl::new();
        {
            let mut session = PartSession::new(&mut control);
            session.run("da0", "destroy", Vec::new()).unwrap();
        }
        let last = control.issued().last().unwrap();
        assert_eq!(last.get("verb").and_then(|v| v.as_str()), Some("undo"));
        assert_eq!(last.get("arg0").and_then(|v| v.as_str()), Some("da0"));
    }

    #[test]
    fn test_partition_type_for_gpt() {
        assert_eq!(partition_type_for("GPT", ""), "freebsd-ufs");
        assert_eq!(partition_type_for("gpt", "FreeBSD"), "freebsd-ufs");
        assert_eq!(partition_type_for("gpt", "swap"), "freebsd-swap");
        assert_eq!(partition_type_for("gpt", "efi"), "efi");
    }

    #[test]
    fn test_partition_type_for_mbr() {
        assert_eq!(partition_type_for("MBR", "freebsd-ufs"), "freebsd");
        assert_eq!(partition_type_for("mbr", "swap"), "freebsd");
        assert_eq!(partition_type_for("mbr", ""), "freebsd");
        assert_eq!(partition_type_for("mbr", "ntfs"), "ntfs");
        assert_eq!(partition_type_for("bsd", "Freebsd-UFS"), "freebsd-ufs");
    }
}
