/// Unit tests of the public building blocks: calendar keys, streak and
/// momentum calculations, reminders and record decoding
mod basic_tests;
