pub mod qrcode;
