// Entity Models
//
// A single entity: the SWIFT/BIC record, plus the read views built from it.

pub mod swift_code;

pub use swift_code::{
    institution_prefix, is_headquarters, resolve_view, BranchView, CountryListing, NewSwiftCode,
    SwiftCode, SwiftCodeView,
};
