pub mod userdtos;
pub mod profiledtos;
pub mod jobdtos;
