mod compile;
mod round_trip;
mod test_utils;
