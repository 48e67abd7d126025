pub mod pose_landmark_client;
