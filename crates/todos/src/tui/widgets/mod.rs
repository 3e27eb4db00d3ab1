pub(super) mod footer;
pub(super) mod guidance;
pub(super) mod header;
pub(super) mod item_list;
pub(super) mod util;
