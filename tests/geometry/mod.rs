mod ball_ball_contact;
mod ball_ball_sweep;
mod box_box_manifold;
mod box_box_sat_agreement;
mod convex_pair_scenario;
mod overlap_position;
mod triangle_convex_scenario;
