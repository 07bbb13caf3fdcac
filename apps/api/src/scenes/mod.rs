// Scene sizing: how many visualization scenes to ask for, given how much the
// user actually wrote.

pub mod recommender;
