// Domain 層: 資料模型與 port，adapter 與 service 依賴這裡，反之不行

pub mod model;
pub mod ports;
