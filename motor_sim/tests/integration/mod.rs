mod drive_scenarios;
mod properties;
mod simulation;
mod vector_limits;
