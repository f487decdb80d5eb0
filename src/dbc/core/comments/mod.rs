pub(crate) mod cm_bo_;
pub(crate) mod cm_sg_;
