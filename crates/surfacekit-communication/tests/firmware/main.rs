mod marlin_link;
