pub mod bipower_averager;
