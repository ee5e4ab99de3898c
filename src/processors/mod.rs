//! Batch pipelines over rater and decision files.

pub mod agreement;
pub mod pairing;
pub mod uncertainty;

// Re-export key types for convenience
pub use agreement::{
    build_agreement_report, classify, parse_component_list, write_agreement_report,
    AgreementError, ComponentList, ComponentStatus, ItemAgreement,
};
pub use pairing::{
    merge_rater_dirs, pair_rater_files, split_subject_session, PairingError, PairingReport,
    RatedItem,
};
pub use uncertainty::{
    ensure_output_dirs, process_decision_dir, UncertaintyError, UncertaintyRecord,
};
