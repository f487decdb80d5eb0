pub(crate) mod ba_;
pub(crate) mod ba_def_;
pub(crate) mod ba_def_def_;
