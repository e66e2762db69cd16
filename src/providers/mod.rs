pub mod floatrates;
pub mod util;
