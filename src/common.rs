pub mod bookkeeping;
pub mod csv_io;
pub mod error;
pub mod i18n;
pub mod validation;
