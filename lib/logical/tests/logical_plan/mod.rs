mod pipeline;
mod test_utils;
mod walker;
