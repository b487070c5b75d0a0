pub mod ec2;
pub mod inventory;
